//! hdid Ledger Client
//!
//! Dispatches encoded contract calls to the ledger:
//! - `client`: `execute` (state-changing, receipt) and `query` (read-only, decoded)
//! - `transport`: the seam between the client and a concrete ledger
//! - `hedera`: gRPC-web transaction submission and mirror node queries

pub mod client;
pub mod error;
pub mod hedera;
pub mod transport;

pub use client::{ExecutionOutcome, LedgerClient};
pub use error::{LedgerError, TransportError};
pub use hedera::HederaTransport;
pub use transport::{ContractCall, LedgerTransport, Receipt};
