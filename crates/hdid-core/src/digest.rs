//! Content digests for off-chain payloads.
//!
//! A payload is serialized once, compact, with the output rules of
//! ECMAScript `JSON.stringify`, and the UTF-8 bytes are hashed with
//! Keccak-256:
//!
//! - object keys keep insertion order, except array-index keys (`"0"`,
//!   `"17"`) which come first in ascending numeric order;
//! - numbers are printed as ECMAScript `Number::toString` prints them, so
//!   `1.0` is `1` and `1e21` is `1e+21`.
//!
//! Two payloads that are semantically equal but ordered differently hash
//! differently.

use serde::Serialize;
use serde_json::{Map, Value};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::path::Path;

use crate::error::CoreError;

/// Keccak-256 digest (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Keccak-256 over raw bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Digest any serializable payload with the fixed serialization.
pub fn digest<T: Serialize + ?Sized>(payload: &T) -> Result<ContentDigest, CoreError> {
    let value = serde_json::to_value(payload).map_err(|e| CoreError::HashInput(e.to_string()))?;
    let text = stringify(&value).map_err(|e| CoreError::HashInput(e.to_string()))?;
    Ok(ContentDigest(keccak256(text.as_bytes())))
}

/// Parse JSON text, keeping key order, and digest the parsed value.
///
/// Whitespace in `text` does not matter; key order does.
pub fn digest_json_str(text: &str) -> Result<ContentDigest, CoreError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| CoreError::HashInput(format!("invalid JSON: {}", e)))?;
    digest(&value)
}

/// Compact JSON text for `value`, byte-for-byte what `JSON.stringify` emits.
pub fn stringify(value: &Value) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    write_value(value, &mut out)?;
    Ok(out)
}

fn write_value(value: &Value, out: &mut String) -> Result<(), serde_json::Error> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => match n.as_f64() {
            Some(f) => write_number(f, out),
            None => out.push_str("null"),
        },
        // serde_json escapes exactly the characters JSON.stringify does.
        Value::String(s) => out.push_str(&serde_json::to_string(s)?),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in property_order(map).into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                write_value(item, out)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

/// Array-index keys ascending, then the remaining keys in insertion order.
fn property_order(map: &Map<String, Value>) -> Vec<(&String, &Value)> {
    let mut indexed: Vec<(u32, (&String, &Value))> = Vec::new();
    let mut named = Vec::new();
    for entry in map.iter() {
        match array_index(entry.0) {
            Some(index) => indexed.push((index, entry)),
            None => named.push(entry),
        }
    }
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, entry)| entry).chain(named).collect()
}

/// Canonical decimal in `0..=2^32 - 2`, no leading zeros.
fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse::<u32>().ok().filter(|&index| index != u32::MAX)
}

/// ECMAScript `Number::toString` for a finite double.
fn write_number(n: f64, out: &mut String) {
    if !n.is_finite() {
        out.push_str("null");
        return;
    }
    if n == 0.0 {
        out.push('0');
        return;
    }
    if n < 0.0 {
        out.push('-');
    }

    // `{:e}` yields the shortest round-tripping digits, e.g. `1.2345e3`.
    let sci = format!("{:e}", n.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let point = exponent.parse::<i32>().unwrap_or(0) + 1;

    if k <= point && point <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((point - k) as usize));
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        out.push_str(int);
        out.push('.');
        out.push_str(frac);
    } else if -6 < point && point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-point) as usize));
        out.push_str(&digits);
    } else {
        let (lead, rest) = digits.split_at(1);
        out.push_str(lead);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        let e = point - 1;
        out.push('e');
        out.push(if e < 0 { '-' } else { '+' });
        out.push_str(&e.abs().to_string());
    }
}

/// Load a payload from `--file` (preferred) or `--data`.
pub fn read_payload(data: Option<&str>, file: Option<&Path>) -> Result<serde_json::Value, CoreError> {
    let text = match (file, data) {
        (Some(path), _) => std::fs::read_to_string(path).map_err(|e| {
            CoreError::HashInput(format!("cannot read {}: {}", path.display(), e))
        })?,
        (None, Some(inline)) => inline.to_string(),
        (None, None) => {
            return Err(CoreError::HashInput(
                "payload data required, use --data or --file".into(),
            ))
        }
    };
    serde_json::from_str(&text).map_err(|e| CoreError::HashInput(format!("invalid JSON: {}", e)))
}
