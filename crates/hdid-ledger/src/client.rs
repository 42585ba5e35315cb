use std::sync::Arc;

use hdid_abi::{ContractInterface, QueryOutcome, Token};
use hdid_core::CanonicalAddress;

use crate::error::{LedgerError, TransportError};
use crate::transport::{ContractCall, LedgerTransport};

/// Default gas limit for contract calls.
pub const DEFAULT_GAS: u64 = 300_000;

/// Result of an admitted state-changing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub transaction_id: String,
    pub status: String,
}

/// Executes and queries functions of one contract.
pub struct LedgerClient {
    interface: Arc<ContractInterface>,
    transport: Box<dyn LedgerTransport>,
    contract: CanonicalAddress,
    gas: u64,
}

impl LedgerClient {
    pub fn new(
        interface: Arc<ContractInterface>,
        transport: Box<dyn LedgerTransport>,
        contract: CanonicalAddress,
    ) -> Self {
        Self {
            interface,
            transport,
            contract,
            gas: DEFAULT_GAS,
        }
    }

    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    /// Encode a call. `read_only` is how the caller intends to send it; a
    /// mismatch with the declared mutability is logged, not refused.
    fn prepare(
        &self,
        function: &str,
        args: &[Token],
        read_only: bool,
    ) -> Result<ContractCall, LedgerError> {
        let mutability = self.interface.function(function)?.state_mutability;
        if mutability.is_read_only() != read_only {
            tracing::debug!(
                function,
                ?mutability,
                read_only,
                "call path does not match declared state mutability"
            );
        }
        let data = self.interface.encode(function, args)?;
        Ok(ContractCall {
            contract: self.contract,
            data,
            gas: self.gas,
        })
    }

    /// Submit a state-changing call and wait for its receipt.
    ///
    /// Exactly one submission is made; a non-`SUCCESS` receipt is an error.
    pub async fn execute(
        &self,
        function: &str,
        args: &[Token],
    ) -> Result<ExecutionOutcome, LedgerError> {
        let call = self.prepare(function, args, false)?;
        tracing::debug!(function, contract = %self.contract, "executing contract call");

        let receipt = self
            .transport
            .submit(&call)
            .await
            .map_err(|source| LedgerError::Execution {
                function: function.to_string(),
                source,
            })?;

        if !receipt.is_success() {
            return Err(LedgerError::Execution {
                function: function.to_string(),
                source: TransportError::Failed {
                    transaction_id: receipt.transaction_id,
                    status: receipt.status,
                },
            });
        }

        tracing::info!(
            function,
            transaction_id = %receipt.transaction_id,
            status = %receipt.status,
            "contract call executed"
        );
        Ok(ExecutionOutcome {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }

    /// Run a read-only call and decode its result.
    pub async fn query(&self, function: &str, args: &[Token]) -> Result<QueryOutcome, LedgerError> {
        let call = self.prepare(function, args, true)?;
        tracing::debug!(function, contract = %self.contract, "querying contract");

        let raw = self
            .transport
            .call(&call)
            .await
            .map_err(|source| LedgerError::Query {
                function: function.to_string(),
                source,
            })?;

        Ok(self.interface.decode(function, &raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Receipt;
    use async_trait::async_trait;
    use hdid_abi::{codec, AbiError, ContractSchema, ParamType};
    use hdid_core::address;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counters {
        submits: AtomicUsize,
        calls: AtomicUsize,
    }

    struct StubTransport {
        counters: Arc<Counters>,
        receipt: Result<Receipt, String>,
        result: Result<Vec<u8>, String>,
    }

    #[async_trait]
    impl LedgerTransport for StubTransport {
        async fn submit(&self, _call: &ContractCall) -> Result<Receipt, TransportError> {
            self.counters.submits.fetch_add(1, Ordering::SeqCst);
            self.receipt.clone().map_err(TransportError::Network)
        }

        async fn call(&self, _call: &ContractCall) -> Result<Vec<u8>, TransportError> {
            self.counters.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(TransportError::Network)
        }
    }

    fn client(
        receipt: Result<Receipt, String>,
        result: Result<Vec<u8>, String>,
    ) -> (LedgerClient, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let transport = StubTransport {
            counters: Arc::clone(&counters),
            receipt,
            result,
        };
        let interface = Arc::new(ContractInterface::new(ContractSchema::bundled().unwrap()));
        let contract = address::resolve("0.0.5678").unwrap();
        (
            LedgerClient::new(interface, Box::new(transport), contract),
            counters,
        )
    }

    fn success() -> Receipt {
        Receipt {
            transaction_id: "0.0.1001@1700000000.000000001".into(),
            status: "SUCCESS".into(),
        }
    }

    #[tokio::test]
    async fn test_execute_success() {
        let (client, counters) = client(Ok(success()), Ok(vec![]));
        let outcome = client.execute("pause", &[]).await.unwrap();
        assert_eq!(outcome.status, "SUCCESS");
        assert_eq!(outcome.transaction_id, "0.0.1001@1700000000.000000001");
        assert_eq!(counters.submits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_execute_unknown_function_makes_no_network_call() {
        let (client, counters) = client(Ok(success()), Ok(vec![]));
        let err = client.execute("nonexistentFn", &[]).await.unwrap_err();
        assert!(matches!(err, LedgerError::Abi(AbiError::UnknownFunction(_))));
        assert_eq!(counters.submits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_query_unknown_function_makes_no_network_call() {
        let (client, counters) = client(Ok(success()), Ok(vec![]));
        let err = client.query("nonexistentFn", &[]).await.unwrap_err();
        assert!(matches!(err, LedgerError::Abi(AbiError::UnknownFunction(_))));
        assert_eq!(counters.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_execute_failed_receipt_is_error() {
        let receipt = Receipt {
            transaction_id: "0.0.1001@1700000000.000000001".into(),
            status: "CONTRACT_REVERT_EXECUTED".into(),
        };
        let (client, counters) = client(Ok(receipt), Ok(vec![]));
        let err = client.execute("unpause", &[]).await.unwrap_err();
        match err {
            LedgerError::Execution { function, source } => {
                assert_eq!(function, "unpause");
                assert!(matches!(source, TransportError::Failed { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(counters.submits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_execute_transport_failure_not_retried() {
        let (client, counters) = client(Err("connection reset".into()), Ok(vec![]));
        let err = client.execute("pause", &[]).await.unwrap_err();
        assert!(matches!(err, LedgerError::Execution { .. }));
        assert_eq!(counters.submits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_query_decodes_result() {
        let raw = codec::encode(&[ParamType::Bool], &[Token::Bool(true)]).unwrap();
        let (client, counters) = client(Ok(success()), Ok(raw));
        let holder = address::resolve("0.0.1234").unwrap();
        let outcome = client
            .query(
                "verifyCredential",
                &[Token::Address(holder), Token::FixedBytes(vec![0; 32])],
            )
            .await
            .unwrap();
        assert_eq!(outcome.at(0).and_then(Token::as_bool), Some(true));
        assert_eq!(counters.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_query_transport_failure() {
        let (client, _) = client(Ok(success()), Err("timeout".into()));
        let err = client.query("paused", &[]).await.unwrap_err();
        assert!(matches!(err, LedgerError::Query { .. }));
    }

    #[tokio::test]
    async fn test_query_decode_error_propagates_unchanged() {
        let (client, _) = client(Ok(success()), Ok(vec![0u8; 3]));
        let err = client.query("paused", &[]).await.unwrap_err();
        assert!(matches!(err, LedgerError::Abi(AbiError::Decode(_))));
    }

    #[tokio::test]
    async fn test_argument_error_before_network() {
        let (client, counters) = client(Ok(success()), Ok(vec![]));
        let err = client
            .execute("grantIssuerRole", &[Token::String("0.0.1".into())])
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Abi(AbiError::ArgumentType(_))));
        assert_eq!(counters.submits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mutability_mismatch_is_not_refused() {
        let raw = codec::encode(&[ParamType::Bool], &[Token::Bool(false)]).unwrap();
        let (client, counters) = client(Ok(success()), Ok(raw));

        client.execute("paused", &[]).await.unwrap();
        assert_eq!(counters.submits.load(Ordering::SeqCst), 1);

        // `pause` is nonpayable; querying it is a dry run.
        let outcome = client.query("pause", &[]).await.unwrap();
        assert_eq!(outcome.iter().count(), 0);
        assert_eq!(counters.calls.load(Ordering::SeqCst), 1);
    }
}
