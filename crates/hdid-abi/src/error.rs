/// Contract interface errors.
#[derive(Debug, thiserror::Error)]
pub enum AbiError {
    #[error("cannot load contract schema: {0}")]
    SchemaLoad(String),

    #[error("unknown contract function: {0}")]
    UnknownFunction(String),

    #[error("invalid argument: {0}")]
    ArgumentType(String),

    #[error("cannot encode call: {0}")]
    Encode(String),

    #[error("cannot decode result: {0}")]
    Decode(String),
}
