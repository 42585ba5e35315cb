//! Hedera transport.
//!
//! State-changing calls are signed `ContractCall` transactions sent to a
//! consensus node over gRPC-web, followed by bounded receipt polling.
//! Read-only calls go to the mirror node.

pub mod grpc_web;
pub mod keys;
pub mod mirror;
pub mod proto;
pub mod status;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prost::Message;

use hdid_core::{address, AccountTriple, CanonicalAddress, CliConfig};

use crate::error::{LedgerError, TransportError};
use crate::transport::{ContractCall, LedgerTransport, Receipt};

use self::grpc_web::GrpcWebClient;
use self::keys::OperatorKey;
use self::mirror::MirrorClient;

const SUBMIT_PATH: &str = "/proto.SmartContractService/contractCallMethod";
const RECEIPT_PATH: &str = "/proto.CryptoService/getTransactionReceipts";

/// Transactions start slightly in the past to tolerate clock skew with the node.
const VALID_START_OFFSET_SECS: i64 = 10;
const VALID_DURATION_SECS: i64 = 120;

struct Operator {
    account: AccountTriple,
    key: OperatorKey,
}

/// [`LedgerTransport`] backed by a Hedera consensus node and mirror node.
pub struct HederaTransport {
    grpc: GrpcWebClient,
    mirror: MirrorClient,
    node_account: AccountTriple,
    operator: Result<Operator, String>,
    max_fee: u64,
    receipt_polls: u32,
    poll_interval: Duration,
}

impl HederaTransport {
    /// Build from configuration. A missing or unparsable operator only fails
    /// on submit, so queries work with just a contract configured.
    pub fn from_config(config: &CliConfig) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LedgerError::Config(format!("failed to build HTTP client: {}", e)))?;

        let operator = match (config.operator_account(), config.operator_key()) {
            (Ok(account), Ok(key)) => OperatorKey::from_hex(key)
                .map(|key| Operator { account, key })
                .map_err(|e| e.to_string()),
            (Err(e), _) | (_, Err(e)) => Err(e.to_string()),
        };
        if let Err(reason) = &operator {
            tracing::debug!(%reason, "no usable operator, transactions disabled");
        }

        Ok(Self {
            grpc: GrpcWebClient::new(http.clone(), config.network.node_url.clone()),
            mirror: MirrorClient::new(http, config.network.mirror_node.clone()),
            node_account: config.node_account()?,
            operator,
            max_fee: config.ledger.max_fee_tinybars,
            receipt_polls: config.ledger.receipt_polls,
            poll_interval: Duration::from_millis(config.ledger.receipt_poll_ms),
        })
    }

    fn operator(&self) -> Result<&Operator, TransportError> {
        self.operator
            .as_ref()
            .map_err(|e| TransportError::Unconfigured(e.clone()))
    }

    async fn wait_for_receipt(&self, id: &proto::TransactionId) -> Result<i32, TransportError> {
        let query = proto::Query {
            query: Some(proto::query::Query::TransactionGetReceipt(
                proto::TransactionGetReceiptQuery {
                    header: Some(proto::QueryHeader::default()),
                    transaction_id: Some(id.clone()),
                    ..Default::default()
                },
            )),
        };

        poll_receipt(self.receipt_polls, self.poll_interval, || {
            self.grpc.unary(RECEIPT_PATH, &query)
        })
        .await
    }
}

/// Poll up to `polls` times, sleeping `interval` between non-final answers.
async fn poll_receipt<F, Fut>(polls: u32, interval: Duration, mut fetch: F) -> Result<i32, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<proto::Response, TransportError>>,
{
    for attempt in 1..=polls {
        match classify_receipt(fetch().await?)? {
            Some(code) => return Ok(code),
            None => {
                tracing::trace!(attempt, "receipt not final");
                if attempt < polls {
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }
    Err(TransportError::ReceiptTimeout(polls))
}

/// Final receipt status, or `None` while the node still reports a pending code.
///
/// A missing receipt under an OK precheck counts as UNKNOWN. A final
/// non-OK precheck is a rejection.
fn classify_receipt(response: proto::Response) -> Result<Option<i32>, TransportError> {
    let Some(proto::response::Response::TransactionGetReceipt(r)) = response.response else {
        return Err(TransportError::Malformed("response is not a receipt".into()));
    };

    let precheck = r.header.map(|h| h.node_transaction_precheck_code).unwrap_or(status::OK);
    let code = match (precheck, r.receipt) {
        (status::OK, Some(receipt)) => receipt.status,
        (status::OK, None) => status::UNKNOWN,
        (other, _) => other,
    };

    if status::is_pending(code) {
        tracing::trace!(status = %status::name(code), "pending receipt status");
        return Ok(None);
    }
    if precheck != status::OK {
        return Err(TransportError::Rejected(status::name(precheck)));
    }
    Ok(Some(code))
}

fn account_id(triple: AccountTriple) -> proto::AccountId {
    proto::AccountId {
        shard_num: i64::from(triple.shard),
        realm_num: triple.realm as i64,
        account: Some(proto::account_id::Account::AccountNum(triple.num as i64)),
    }
}

fn contract_id(contract: &CanonicalAddress) -> proto::ContractId {
    match contract.to_triple() {
        Some(triple) => proto::ContractId {
            shard_num: i64::from(triple.shard),
            realm_num: triple.realm as i64,
            contract: Some(proto::contract_id::Contract::ContractNum(triple.num as i64)),
        },
        None => proto::ContractId {
            shard_num: 0,
            realm_num: 0,
            contract: Some(proto::contract_id::Contract::EvmAddress(
                contract.as_bytes().to_vec(),
            )),
        },
    }
}

fn transaction_id(payer: AccountTriple, now: DateTime<Utc>) -> proto::TransactionId {
    let start = now - chrono::Duration::seconds(VALID_START_OFFSET_SECS);
    proto::TransactionId {
        transaction_valid_start: Some(proto::Timestamp {
            seconds: start.timestamp(),
            nanos: start.timestamp_subsec_nanos() as i32,
        }),
        account_id: Some(account_id(payer)),
        scheduled: false,
        nonce: 0,
    }
}

/// Build and sign a contract call transaction.
fn build_transaction(
    call: &ContractCall,
    id: proto::TransactionId,
    node: AccountTriple,
    max_fee: u64,
    key: &OperatorKey,
) -> proto::Transaction {
    let body = proto::TransactionBody {
        transaction_id: Some(id),
        node_account_id: Some(account_id(node)),
        transaction_fee: max_fee,
        transaction_valid_duration: Some(proto::Duration {
            seconds: VALID_DURATION_SECS,
        }),
        memo: String::new(),
        data: Some(proto::transaction_body::Data::ContractCall(
            proto::ContractCallTransactionBody {
                contract_id: Some(contract_id(&call.contract)),
                gas: call.gas as i64,
                amount: 0,
                function_parameters: call.data.as_bytes().to_vec(),
            },
        )),
    };
    let body_bytes = body.encode_to_vec();
    let signature = key.sign(&body_bytes);

    let signed = proto::SignedTransaction {
        body_bytes,
        sig_map: Some(proto::SignatureMap {
            sig_pair: vec![proto::SignaturePair {
                pub_key_prefix: key.public_key_bytes().to_vec(),
                signature: Some(proto::signature_pair::Signature::Ed25519(signature.to_vec())),
            }],
        }),
    };
    proto::Transaction {
        signed_transaction_bytes: signed.encode_to_vec(),
    }
}

#[async_trait]
impl LedgerTransport for HederaTransport {
    async fn submit(&self, call: &ContractCall) -> Result<Receipt, TransportError> {
        let operator = self.operator()?;
        let id = transaction_id(operator.account, Utc::now());
        let display_id = id.display();
        let tx = build_transaction(call, id.clone(), self.node_account, self.max_fee, &operator.key);

        tracing::debug!(transaction_id = %display_id, function = call.data.function(), "submitting transaction");
        let response: proto::TransactionResponse = self.grpc.unary(SUBMIT_PATH, &tx).await?;
        if response.node_transaction_precheck_code != status::OK {
            return Err(TransportError::Rejected(status::name(
                response.node_transaction_precheck_code,
            )));
        }

        let code = self.wait_for_receipt(&id).await?;
        Ok(Receipt {
            transaction_id: display_id,
            status: status::name(code),
        })
    }

    async fn call(&self, call: &ContractCall) -> Result<Vec<u8>, TransportError> {
        let from = self
            .operator
            .as_ref()
            .ok()
            .map(|op| address::resolve_triple(op.account));
        self.mirror.call(call, from.as_ref()).await
    }
}
