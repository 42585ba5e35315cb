use std::fmt;

use crate::codec;
use crate::error::AbiError;
use crate::schema::{ContractSchema, FunctionDescriptor, ParamType};
use crate::token::Token;

/// Selector followed by ABI-encoded arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
    function: String,
    bytes: Vec<u8>,
}

impl EncodedCall {
    /// Name of the function this call targets.
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn selector(&self) -> &[u8] {
        &self.bytes[..4]
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.bytes))
    }
}

/// Decoded return values, in the function's declared output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    fields: Vec<(String, Token)>,
}

impl QueryOutcome {
    /// Value of a named output.
    pub fn get(&self, name: &str) -> Option<&Token> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Value at a position.
    pub fn at(&self, index: usize) -> Option<&Token> {
        self.fields.get(index).map(|(_, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Token)> {
        self.fields.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.fields.into_iter().map(|(_, t)| t).collect()
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.fields.iter().map(|(n, t)| format!("{}={}", n, t)).collect();
        write!(f, "({})", parts.join(", "))
    }
}

/// Encodes and decodes calls against one loaded contract schema.
#[derive(Debug, Clone)]
pub struct ContractInterface {
    schema: ContractSchema,
}

impl ContractInterface {
    pub fn new(schema: ContractSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &ContractSchema {
        &self.schema
    }

    /// Descriptor of `name`, or [`AbiError::UnknownFunction`].
    pub fn function(&self, name: &str) -> Result<&FunctionDescriptor, AbiError> {
        self.schema.function(name)
    }

    /// Encode a call to `function` with positional `args`.
    pub fn encode(&self, function: &str, args: &[Token]) -> Result<EncodedCall, AbiError> {
        let descriptor = self.schema.function(function)?;
        if args.len() != descriptor.inputs.len() {
            return Err(AbiError::ArgumentType(format!(
                "{} expects {} argument(s), got {}",
                descriptor.signature(),
                descriptor.inputs.len(),
                args.len()
            )));
        }
        for (i, (param, arg)) in descriptor.inputs.iter().zip(args).enumerate() {
            arg.type_check(param.kind).map_err(|reason| {
                AbiError::ArgumentType(format!(
                    "{} argument {} ({}): {}",
                    descriptor.name,
                    i,
                    display_name(&param.name, i),
                    reason
                ))
            })?;
        }

        let kinds: Vec<ParamType> = descriptor.inputs.iter().map(|p| p.kind).collect();
        let mut bytes = descriptor.selector().to_vec();
        bytes.extend(codec::encode(&kinds, args)?);

        tracing::debug!(
            function = %descriptor.signature(),
            len = bytes.len(),
            "encoded contract call"
        );
        Ok(EncodedCall {
            function: descriptor.name.clone(),
            bytes,
        })
    }

    /// Decode the raw return bytes of `function`.
    pub fn decode(&self, function: &str, data: &[u8]) -> Result<QueryOutcome, AbiError> {
        let descriptor = self.schema.function(function)?;
        let kinds: Vec<ParamType> = descriptor.outputs.iter().map(|p| p.kind).collect();
        let tokens = codec::decode(&kinds, data)
            .map_err(|reason| AbiError::Decode(format!("{}: {}", descriptor.name, reason)))?;

        let fields = descriptor
            .outputs
            .iter()
            .enumerate()
            .map(|(i, p)| display_name(&p.name, i))
            .zip(tokens)
            .collect();
        Ok(QueryOutcome { fields })
    }
}

/// Unnamed parameters are addressed by position.
fn display_name(name: &str, index: usize) -> String {
    if name.is_empty() {
        index.to_string()
    } else {
        name.to_string()
    }
}
