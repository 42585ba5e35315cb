//! Read-only contract calls through the mirror node REST API.

use serde::{Deserialize, Serialize};

use hdid_core::CanonicalAddress;

use crate::error::TransportError;
use crate::transport::ContractCall;

const CALL_PATH: &str = "/api/v1/contracts/call";

#[derive(Serialize, Debug)]
struct CallRequest {
    block: &'static str,
    data: String,
    estimate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    gas: u64,
    to: String,
}

#[derive(Deserialize, Debug)]
struct CallResponse {
    result: String,
}

#[derive(Deserialize, Debug, Default)]
struct ErrorResponse {
    #[serde(rename = "_status", default)]
    status: ErrorStatus,
}

#[derive(Deserialize, Debug, Default)]
struct ErrorStatus {
    #[serde(default)]
    messages: Vec<ErrorMessage>,
}

#[derive(Deserialize, Debug)]
struct ErrorMessage {
    message: String,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

impl ErrorResponse {
    fn describe(&self) -> Option<String> {
        let lines: Vec<String> = self
            .status
            .messages
            .iter()
            .map(|m| {
                let mut line = m.message.clone();
                for extra in [&m.detail, &m.data].into_iter().flatten() {
                    if !extra.is_empty() {
                        line.push_str(" (");
                        line.push_str(extra);
                        line.push(')');
                    }
                }
                line
            })
            .collect();
        (!lines.is_empty()).then(|| lines.join("; "))
    }
}

fn request_body(call: &ContractCall, from: Option<&CanonicalAddress>) -> CallRequest {
    CallRequest {
        block: "latest",
        data: call.data.to_hex(),
        estimate: false,
        from: from.map(ToString::to_string),
        gas: call.gas,
        to: call.contract.to_string(),
    }
}

fn decode_result(result: &str) -> Result<Vec<u8>, TransportError> {
    let digits = result.strip_prefix("0x").unwrap_or(result);
    hex::decode(digits)
        .map_err(|e| TransportError::Malformed(format!("mirror node result is not hex: {}", e)))
}

/// Mirror node client for `eth_call`-style queries.
#[derive(Debug, Clone)]
pub struct MirrorClient {
    http: reqwest::Client,
    base_url: String,
}

impl MirrorClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn call(
        &self,
        call: &ContractCall,
        from: Option<&CanonicalAddress>,
    ) -> Result<Vec<u8>, TransportError> {
        let url = format!("{}{}", self.base_url, CALL_PATH);
        let body = request_body(call, from);
        tracing::debug!(url = %url, to = %body.to, "mirror node contract call");

        let resp = self.http.post(&url).json(&body).send().await?;
        let status = resp.status();
        if status.is_success() {
            let data: CallResponse = resp.json().await?;
            return decode_result(&data.result);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .ok()
            .and_then(|e| e.describe())
            .unwrap_or(text);
        Err(TransportError::Mirror {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdid_abi::{ContractInterface, ContractSchema};
    use hdid_core::address;

    #[test]
    fn test_request_body_fields() {
        let iface = ContractInterface::new(ContractSchema::bundled().unwrap());
        let call = ContractCall {
            contract: address::resolve("0.0.5678").unwrap(),
            data: iface.encode("paused", &[]).unwrap(),
            gas: 300_000,
        };
        let from = address::resolve("0.0.1001").unwrap();

        let json = serde_json::to_value(request_body(&call, Some(&from))).unwrap();
        assert_eq!(json["block"], "latest");
        assert_eq!(json["estimate"], false);
        assert_eq!(json["gas"], 300_000);
        assert_eq!(json["to"], "0x000000000000000000000000000000000000162e");
        assert_eq!(json["from"], "0x00000000000000000000000000000000000003e9");
        assert_eq!(json["data"], "0x5c975abb");

        let json = serde_json::to_value(request_body(&call, None)).unwrap();
        assert!(json.get("from").is_none());
    }

    #[test]
    fn test_decode_result() {
        assert_eq!(decode_result("0x0001").unwrap(), vec![0, 1]);
        assert_eq!(decode_result("0x").unwrap(), Vec::<u8>::new());
        assert!(matches!(decode_result("0xzz"), Err(TransportError::Malformed(_))));
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"_status":{"messages":[{"message":"CONTRACT_REVERT_EXECUTED","detail":"not issuer","data":"0x08c3"}]}}"#;
        let err: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            err.describe().unwrap(),
            "CONTRACT_REVERT_EXECUTED (not issuer) (0x08c3)"
        );

        let empty: ErrorResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.describe().is_none());
    }
}
