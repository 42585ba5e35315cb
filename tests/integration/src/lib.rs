//! Test doubles shared by the integration scenarios.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use hdid_abi::{ContractInterface, ContractSchema};
use hdid_core::address;
use hdid_ledger::{ContractCall, LedgerClient, LedgerTransport, Receipt, TransportError};

/// Contract address every scenario talks to.
pub const REGISTRY: &str = "0.0.5678";

/// Records every request and replays scripted responses in order.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    submitted: Arc<Mutex<Vec<ContractCall>>>,
    called: Arc<Mutex<Vec<ContractCall>>>,
    receipts: Arc<Mutex<VecDeque<Result<Receipt, TransportError>>>>,
    results: Arc<Mutex<VecDeque<Result<Vec<u8>, TransportError>>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_receipt(&self, receipt: Result<Receipt, TransportError>) {
        self.receipts.lock().unwrap().push_back(receipt);
    }

    pub fn push_result(&self, result: Result<Vec<u8>, TransportError>) {
        self.results.lock().unwrap().push_back(result);
    }

    pub fn submitted(&self) -> Vec<ContractCall> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn called(&self) -> Vec<ContractCall> {
        self.called.lock().unwrap().clone()
    }

    /// Number of requests of either kind.
    pub fn request_count(&self) -> usize {
        self.submitted.lock().unwrap().len() + self.called.lock().unwrap().len()
    }

    /// A client for the bundled registry schema backed by this transport.
    pub fn client(&self) -> LedgerClient {
        let schema = ContractSchema::bundled().expect("bundled schema");
        self.client_with(ContractInterface::new(schema))
    }

    pub fn client_with(&self, interface: ContractInterface) -> LedgerClient {
        LedgerClient::new(
            Arc::new(interface),
            Box::new(self.clone()),
            address::resolve(REGISTRY).expect("registry address"),
        )
    }
}

#[async_trait]
impl LedgerTransport for RecordingTransport {
    async fn submit(&self, call: &ContractCall) -> Result<Receipt, TransportError> {
        tracing::debug!(function = call.data.function(), "recorded submit");
        self.submitted.lock().unwrap().push(call.clone());
        self.receipts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(success_receipt()))
    }

    async fn call(&self, call: &ContractCall) -> Result<Vec<u8>, TransportError> {
        tracing::debug!(function = call.data.function(), "recorded call");
        self.called.lock().unwrap().push(call.clone());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted result".into())))
    }
}

pub fn success_receipt() -> Receipt {
    Receipt {
        transaction_id: "0.0.1001@1700000000.000000001".into(),
        status: "SUCCESS".into(),
    }
}
