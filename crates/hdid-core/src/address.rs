//! Identifier resolution.
//!
//! Operators hand us either a ledger-native account triple
//! (`shard.realm.num`) or a 20-byte hex address. Every downstream component
//! works only with [`CanonicalAddress`], which is constructed exclusively by
//! [`resolve`] and [`resolve_bytes`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Length of a canonical address in bytes.
pub const ADDRESS_LEN: usize = 20;

const HEX_PREFIX: &str = "0x";

/// A ledger-native `shard.realm.num` identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountTriple {
    pub shard: u32,
    pub realm: u64,
    pub num: u64,
}

impl AccountTriple {
    pub fn new(shard: u32, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    /// Long-zero address derivation: shard (4 bytes) ‖ realm (8) ‖ num (8),
    /// all big-endian.
    fn to_address_bytes(self) -> [u8; ADDRESS_LEN] {
        let mut out = [0u8; ADDRESS_LEN];
        out[..4].copy_from_slice(&self.shard.to_be_bytes());
        out[4..12].copy_from_slice(&self.realm.to_be_bytes());
        out[12..].copy_from_slice(&self.num.to_be_bytes());
        out
    }
}

impl fmt::Display for AccountTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for AccountTriple {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(CoreError::invalid_identifier(
                s,
                format!("expected 3 components, got {}", parts.len()),
            ));
        }
        for part in &parts {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CoreError::invalid_identifier(
                    s,
                    format!("component '{}' is not a non-negative integer", part),
                ));
            }
        }
        let shard = parts[0]
            .parse::<u32>()
            .map_err(|_| CoreError::invalid_identifier(s, "shard out of range"))?;
        let realm = parts[1]
            .parse::<u64>()
            .map_err(|_| CoreError::invalid_identifier(s, "realm out of range"))?;
        let num = parts[2]
            .parse::<u64>()
            .map_err(|_| CoreError::invalid_identifier(s, "number out of range"))?;
        Ok(Self { shard, realm, num })
    }
}

/// Operator-supplied identifier, classified by a strict grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identifier {
    /// `shard.realm.num`
    LedgerNativeTriple(AccountTriple),
    /// `0x`-prefixed or bare 40-digit hex.
    HexAddress([u8; ADDRESS_LEN]),
}

impl Identifier {
    /// Classify `input`. Inputs matching neither notation are rejected.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        if looks_like_triple(input) {
            return input.parse().map(Self::LedgerNativeTriple);
        }

        let digits = input.strip_prefix(HEX_PREFIX).unwrap_or(input);
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(CoreError::invalid_identifier(
                input,
                format!(
                    "expected a shard.realm.num triple or {} hex digits, got {} characters",
                    ADDRESS_LEN * 2,
                    digits.len()
                ),
            ));
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| CoreError::invalid_identifier(input, format!("invalid hex: {}", e)))?;
        Ok(Self::HexAddress(bytes))
    }
}

/// Anything containing only digits and dots is held to the triple grammar,
/// so `0.0` or `1.2.3.4` fail as malformed triples rather than as hex.
fn looks_like_triple(input: &str) -> bool {
    input.contains('.') && input.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}

/// A 20-byte address rendered as `0x` + 40 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalAddress([u8; ADDRESS_LEN]);

impl CanonicalAddress {
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Recover `0.0.num` when this is a long-zero address (top 12 bytes zero).
    pub fn to_triple(&self) -> Option<AccountTriple> {
        let b = &self.0;
        if !b[..12].iter().all(|x| *x == 0) {
            return None;
        }
        let num = u64::from_be_bytes(b[12..].try_into().ok()?);
        Some(AccountTriple::new(0, 0, num))
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", HEX_PREFIX, hex::encode(self.0))
    }
}

impl Serialize for CanonicalAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Resolve an operator-supplied identifier to its canonical address.
///
/// Pure and idempotent: resolving an already-canonical address returns it
/// unchanged. Output is always lowercase hex, so checksummed input comes
/// back lowercased.
pub fn resolve(identifier: &str) -> Result<CanonicalAddress, CoreError> {
    let resolved = match Identifier::parse(identifier)? {
        Identifier::LedgerNativeTriple(triple) => CanonicalAddress(triple.to_address_bytes()),
        Identifier::HexAddress(bytes) => CanonicalAddress(bytes),
    };
    tracing::trace!(input = identifier, address = %resolved, "resolved identifier");
    Ok(resolved)
}

/// Wrap raw address bytes taken from decoded contract output.
pub fn resolve_bytes(bytes: [u8; ADDRESS_LEN]) -> CanonicalAddress {
    CanonicalAddress(bytes)
}

/// Resolve a ledger-native triple directly.
pub fn resolve_triple(triple: AccountTriple) -> CanonicalAddress {
    CanonicalAddress(triple.to_address_bytes())
}
