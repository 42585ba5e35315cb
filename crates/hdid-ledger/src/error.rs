use hdid_abi::AbiError;
use hdid_core::CoreError;

/// Failures talking to the ledger.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("transaction rejected by node: {0}")]
    Rejected(String),

    #[error("transaction {transaction_id} failed with status {status}")]
    Failed {
        transaction_id: String,
        status: String,
    },

    #[error("no final receipt after {0} polls")]
    ReceiptTimeout(u32),

    #[error("mirror node returned HTTP {status}: {message}")]
    Mirror { status: u16, message: String },

    #[error("malformed ledger response: {0}")]
    Malformed(String),

    #[error("operator not configured: {0}")]
    Unconfigured(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

impl From<prost::DecodeError> for TransportError {
    fn from(e: prost::DecodeError) -> Self {
        Self::Malformed(e.to_string())
    }
}

/// Errors returned by [`crate::LedgerClient`].
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Encoding or decoding failed; passed through unchanged.
    #[error(transparent)]
    Abi(#[from] AbiError),

    #[error("failed to execute {function}")]
    Execution {
        function: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to query {function}")]
    Query {
        function: String,
        #[source]
        source: TransportError,
    },

    #[error("ledger configuration error: {0}")]
    Config(String),
}

impl From<CoreError> for LedgerError {
    fn from(e: CoreError) -> Self {
        Self::Config(e.to_string())
    }
}
