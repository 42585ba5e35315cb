use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use hdid_core::digest::keccak256;

use crate::error::AbiError;

/// The schema of the DID registry contract, shipped with the binary.
pub const BUNDLED_SCHEMA: &str = include_str!("../contracts/DidRegistry.json");

/// Solidity elementary types understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Address,
    Bool,
    /// `uintN`, N in bits.
    Uint(usize),
    /// `intN`, N in bits.
    Int(usize),
    /// `bytesN`, N in bytes.
    FixedBytes(usize),
    Bytes,
    String,
}

impl ParamType {
    /// Whether the value lives in the tail section of the encoding.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Bytes | Self::String)
    }

    /// Parse a canonical Solidity type name.
    pub fn parse(name: &str) -> Result<Self, AbiError> {
        let unsupported = || AbiError::SchemaLoad(format!("unsupported parameter type '{}'", name));
        match name {
            "address" => return Ok(Self::Address),
            "bool" => return Ok(Self::Bool),
            "string" => return Ok(Self::String),
            "bytes" => return Ok(Self::Bytes),
            "uint" => return Ok(Self::Uint(256)),
            "int" => return Ok(Self::Int(256)),
            _ => {}
        }
        if let Some(bits) = name.strip_prefix("uint") {
            let bits: usize = bits.parse().map_err(|_| unsupported())?;
            if bits == 0 || bits > 256 || bits % 8 != 0 {
                return Err(unsupported());
            }
            return Ok(Self::Uint(bits));
        }
        if let Some(bits) = name.strip_prefix("int") {
            let bits: usize = bits.parse().map_err(|_| unsupported())?;
            if bits == 0 || bits > 256 || bits % 8 != 0 {
                return Err(unsupported());
            }
            return Ok(Self::Int(bits));
        }
        if let Some(len) = name.strip_prefix("bytes") {
            let len: usize = len.parse().map_err(|_| unsupported())?;
            if len == 0 || len > 32 {
                return Err(unsupported());
            }
            return Ok(Self::FixedBytes(len));
        }
        Err(unsupported())
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => write!(f, "address"),
            Self::Bool => write!(f, "bool"),
            Self::Uint(bits) => write!(f, "uint{}", bits),
            Self::Int(bits) => write!(f, "int{}", bits),
            Self::FixedBytes(len) => write!(f, "bytes{}", len),
            Self::Bytes => write!(f, "bytes"),
            Self::String => write!(f, "string"),
        }
    }
}

/// A named, typed function parameter or return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub kind: ParamType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateMutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl StateMutability {
    /// `pure` and `view` functions cannot change contract state.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Pure | Self::View)
    }
}

/// One callable contract function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: String,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

impl FunctionDescriptor {
    /// Canonical signature, e.g. `revokeCredential(address,bytes32)`.
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(|p| p.kind.to_string()).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// First four bytes of the Keccak-256 of the signature.
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature().as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }
}

/// Closed table of contract functions, built once and never mutated.
#[derive(Debug, Clone)]
pub struct ContractSchema {
    functions: Vec<FunctionDescriptor>,
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Abi(Vec<RawEntry>),
    Artifact { abi: Vec<RawEntry> },
}

#[derive(Deserialize)]
struct RawEntry {
    #[serde(rename = "type", default = "default_entry_type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(rename = "stateMutability", default)]
    state_mutability: Option<String>,
    #[serde(default)]
    constant: bool,
}

#[derive(Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

fn default_entry_type() -> String {
    "function".into()
}

fn convert_params(function: &str, raw: Vec<RawParam>) -> Result<Vec<Param>, AbiError> {
    raw.into_iter()
        .map(|p| {
            let kind = ParamType::parse(&p.kind)
                .map_err(|e| AbiError::SchemaLoad(format!("function {}: {}", function, e)))?;
            Ok(Param { name: p.name, kind })
        })
        .collect()
}

fn convert_mutability(entry: &RawEntry) -> Result<StateMutability, AbiError> {
    match entry.state_mutability.as_deref() {
        Some("pure") => Ok(StateMutability::Pure),
        Some("view") => Ok(StateMutability::View),
        Some("nonpayable") => Ok(StateMutability::NonPayable),
        Some("payable") => Ok(StateMutability::Payable),
        Some(other) => Err(AbiError::SchemaLoad(format!(
            "function {}: unknown state mutability '{}'",
            entry.name, other
        ))),
        // Pre-0.5 ABI files only carry `constant`.
        None if entry.constant => Ok(StateMutability::View),
        None => Ok(StateMutability::NonPayable),
    }
}

impl ContractSchema {
    /// Build the table from ABI JSON (a bare array or an artifact with an `abi` key).
    pub fn from_json(text: &str) -> Result<Self, AbiError> {
        let document: RawDocument =
            serde_json::from_str(text).map_err(|e| AbiError::SchemaLoad(e.to_string()))?;
        let entries = match document {
            RawDocument::Abi(entries) | RawDocument::Artifact { abi: entries } => entries,
        };

        let mut schema = Self {
            functions: Vec::new(),
            index: HashMap::new(),
        };

        for entry in entries {
            if entry.kind != "function" {
                continue;
            }
            if entry.name.is_empty() {
                return Err(AbiError::SchemaLoad("function entry without a name".into()));
            }
            if schema.index.contains_key(&entry.name) {
                return Err(AbiError::SchemaLoad(format!(
                    "overloaded function '{}' is not supported",
                    entry.name
                )));
            }
            let state_mutability = convert_mutability(&entry)?;
            let descriptor = FunctionDescriptor {
                inputs: convert_params(&entry.name, entry.inputs)?,
                outputs: convert_params(&entry.name, entry.outputs)?,
                name: entry.name,
                state_mutability,
            };
            schema
                .index
                .insert(descriptor.name.clone(), schema.functions.len());
            schema.functions.push(descriptor);
        }

        tracing::debug!(functions = schema.functions.len(), "loaded contract schema");
        Ok(schema)
    }

    /// Load ABI JSON from a file.
    pub fn load(path: &Path) -> Result<Self, AbiError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AbiError::SchemaLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /// The DID registry schema shipped with the binary.
    pub fn bundled() -> Result<Self, AbiError> {
        Self::from_json(BUNDLED_SCHEMA)
    }

    /// Look up a function by name.
    pub fn function(&self, name: &str) -> Result<&FunctionDescriptor, AbiError> {
        self.index
            .get(name)
            .map(|&i| &self.functions[i])
            .ok_or_else(|| AbiError::UnknownFunction(name.to_string()))
    }

    /// Functions in declaration order.
    pub fn functions(&self) -> &[FunctionDescriptor] {
        &self.functions
    }

    /// Number of functions in the schema.
    pub fn len(&self) -> usize {
        self.functions.len()
    }
}
