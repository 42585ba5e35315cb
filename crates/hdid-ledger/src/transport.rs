use async_trait::async_trait;

use hdid_abi::EncodedCall;
use hdid_core::CanonicalAddress;

use crate::error::TransportError;

/// A call addressed to the registry contract.
#[derive(Debug, Clone)]
pub struct ContractCall {
    pub contract: CanonicalAddress,
    pub data: EncodedCall,
    pub gas: u64,
}

/// Final receipt of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_id: String,
    pub status: String,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == "SUCCESS"
    }
}

/// The ledger operations the client needs. One call is one round trip;
/// implementations never retry a submission.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Sign and submit a state-changing call, then wait for its receipt.
    async fn submit(&self, call: &ContractCall) -> Result<Receipt, TransportError>;

    /// Run a read-only call and return the raw result bytes.
    async fn call(&self, call: &ContractCall) -> Result<Vec<u8>, TransportError>;
}
