use std::fmt;

use hdid_core::CanonicalAddress;

use crate::error::AbiError;
use crate::schema::ParamType;

/// A typed ABI value.
///
/// Integers are carried as 128-bit values; wider on-chain values are
/// rejected when decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(CanonicalAddress),
    Bool(bool),
    Uint(u128),
    Int(i128),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
}

impl Token {
    /// Parse `0x`-prefixed (or bare) hex of exactly `len` bytes into a `bytesN` token.
    pub fn fixed_bytes_from_hex(input: &str, len: usize) -> Result<Self, AbiError> {
        let digits = input.strip_prefix("0x").unwrap_or(input);
        let bytes = hex::decode(digits)
            .map_err(|e| AbiError::ArgumentType(format!("'{}' is not hex: {}", input, e)))?;
        if bytes.len() != len {
            return Err(AbiError::ArgumentType(format!(
                "'{}' must be {} bytes, got {}",
                input,
                len,
                bytes.len()
            )));
        }
        Ok(Self::FixedBytes(bytes))
    }

    /// Check that this value can be encoded as `kind`.
    pub fn type_check(&self, kind: ParamType) -> Result<(), String> {
        match (self, kind) {
            (Self::Address(_), ParamType::Address)
            | (Self::Bool(_), ParamType::Bool)
            | (Self::Bytes(_), ParamType::Bytes)
            | (Self::String(_), ParamType::String) => Ok(()),
            (Self::Uint(v), ParamType::Uint(bits)) => {
                if bits < 128 && *v >> bits != 0 {
                    Err(format!("{} does not fit in uint{}", v, bits))
                } else {
                    Ok(())
                }
            }
            (Self::Int(v), ParamType::Int(bits)) => {
                if bits < 128 {
                    let min = -(1i128 << (bits - 1));
                    let max = (1i128 << (bits - 1)) - 1;
                    if *v < min || *v > max {
                        return Err(format!("{} does not fit in int{}", v, bits));
                    }
                }
                Ok(())
            }
            (Self::FixedBytes(b), ParamType::FixedBytes(len)) => {
                if b.len() == len {
                    Ok(())
                } else {
                    Err(format!("expected {} bytes, got {}", len, b.len()))
                }
            }
            (token, kind) => Err(format!("expected {}, got {}", kind, token.kind_name())),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Bool(_) => "bool",
            Self::Uint(_) => "unsigned integer",
            Self::Int(_) => "signed integer",
            Self::FixedBytes(_) => "fixed bytes",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u128> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&CanonicalAddress> {
        match self {
            Self::Address(a) => Some(a),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(a) => write!(f, "{}", a),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Uint(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::FixedBytes(b) | Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}
