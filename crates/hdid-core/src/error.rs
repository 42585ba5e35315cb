/// Core errors: identifier parsing, payload hashing, and configuration.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid identifier '{input}': {reason}")]
    InvalidIdentifier { input: String, reason: String },

    #[error("cannot hash payload: {0}")]
    HashInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn invalid_identifier(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
