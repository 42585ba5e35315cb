//! Solidity ABI encoding for elementary types.
//!
//! Every parameter occupies one 32-byte head word. Static values are stored
//! in place; `bytes` and `string` store an offset to a tail section holding
//! a length word followed by the data, right-padded to a word boundary.

use hdid_core::address;

use crate::error::AbiError;
use crate::schema::ParamType;
use crate::token::Token;

const WORD: usize = 32;

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

fn uint_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn static_word(token: &Token) -> Result<[u8; WORD], AbiError> {
    let mut word = [0u8; WORD];
    match token {
        Token::Address(a) => word[12..].copy_from_slice(a.as_bytes()),
        Token::Bool(b) => word[31] = u8::from(*b),
        Token::Uint(v) => word = uint_word(*v),
        Token::Int(v) => {
            if *v < 0 {
                word[..16].fill(0xff);
            }
            word[16..].copy_from_slice(&v.to_be_bytes());
        }
        Token::FixedBytes(b) => {
            if b.len() > WORD {
                return Err(AbiError::Encode(format!("fixed bytes of length {}", b.len())));
            }
            word[..b.len()].copy_from_slice(b);
        }
        Token::Bytes(_) | Token::String(_) => {
            return Err(AbiError::Encode("dynamic value in a static slot".into()))
        }
    }
    Ok(word)
}

/// Encode `tokens` laid out as `params`. Tokens must already be type-checked.
pub fn encode(params: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
    if params.len() != tokens.len() {
        return Err(AbiError::Encode(format!(
            "{} values for {} parameters",
            tokens.len(),
            params.len()
        )));
    }

    let head_len = params.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for (kind, token) in params.iter().zip(tokens) {
        if kind.is_dynamic() {
            let data: &[u8] = match token {
                Token::Bytes(b) => b,
                Token::String(s) => s.as_bytes(),
                _ => return Err(AbiError::Encode(format!("{} slot holds a static value", kind))),
            };
            let offset = u128::try_from(head_len + tail.len())
                .map_err(|_| AbiError::Encode("offset overflow".into()))?;
            head.extend_from_slice(&uint_word(offset));
            tail.extend_from_slice(&uint_word(data.len() as u128));
            tail.extend_from_slice(data);
            tail.resize(padded_len(tail.len()), 0);
        } else {
            head.extend_from_slice(&static_word(token)?);
        }
    }

    head.extend_from_slice(&tail);
    Ok(head)
}

fn word_at(data: &[u8], offset: usize) -> Result<&[u8], String> {
    offset
        .checked_add(WORD)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| format!("data too short: need a word at offset {}, have {} bytes", offset, data.len()))
}

fn word_to_usize(word: &[u8]) -> Result<usize, String> {
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err("offset or length out of range".into());
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(low)).map_err(|_| "offset or length out of range".to_string())
}

fn decode_static(kind: ParamType, word: &[u8]) -> Result<Token, String> {
    match kind {
        ParamType::Address => {
            if word[..12].iter().any(|b| *b != 0) {
                return Err("address word has non-zero padding".into());
            }
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&word[12..]);
            Ok(Token::Address(address::resolve_bytes(bytes)))
        }
        ParamType::Bool => match (word[..31].iter().all(|b| *b == 0), word[31]) {
            (true, 0) => Ok(Token::Bool(false)),
            (true, 1) => Ok(Token::Bool(true)),
            _ => Err("invalid boolean word".into()),
        },
        ParamType::Uint(bits) => {
            if word[..16].iter().any(|b| *b != 0) {
                return Err(format!("uint{} value exceeds 128 bits", bits));
            }
            let mut low = [0u8; 16];
            low.copy_from_slice(&word[16..]);
            let value = u128::from_be_bytes(low);
            let token = Token::Uint(value);
            token.type_check(kind)?;
            Ok(token)
        }
        ParamType::Int(bits) => {
            let mut low = [0u8; 16];
            low.copy_from_slice(&word[16..]);
            let value = i128::from_be_bytes(low);
            let fill = if value < 0 { 0xff } else { 0x00 };
            if word[..16].iter().any(|b| *b != fill) {
                return Err(format!("int{} value exceeds 128 bits", bits));
            }
            let token = Token::Int(value);
            token.type_check(kind)?;
            Ok(token)
        }
        ParamType::FixedBytes(len) => Ok(Token::FixedBytes(word[..len].to_vec())),
        ParamType::Bytes | ParamType::String => Err("dynamic type in static decoder".into()),
    }
}

/// Decode `data` laid out as `params`.
pub fn decode(params: &[ParamType], data: &[u8]) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::with_capacity(params.len());

    for (i, kind) in params.iter().enumerate() {
        let head = word_at(data, i * WORD)?;
        if !kind.is_dynamic() {
            tokens.push(decode_static(*kind, head)?);
            continue;
        }

        let offset = word_to_usize(head)?;
        let len = word_to_usize(word_at(data, offset)?)?;
        let start = offset + WORD;
        let bytes = start
            .checked_add(len)
            .and_then(|end| data.get(start..end))
            .ok_or_else(|| format!("data too short: {} bytes at offset {}", len, start))?;

        tokens.push(match kind {
            ParamType::String => Token::String(
                String::from_utf8(bytes.to_vec()).map_err(|_| "string is not valid UTF-8".to_string())?,
            ),
            _ => Token::Bytes(bytes.to_vec()),
        });
    }

    Ok(tokens)
}
