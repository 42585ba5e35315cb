//! Integration test: credential lifecycle across resolver, hasher, contract
//! interface and ledger client.

use hdid_abi::{codec, AbiError, ParamType, Token};
use hdid_core::{address, digest};
use hdid_integration_tests::RecordingTransport;
use hdid_ledger::{LedgerError, Receipt, TransportError};

fn zero_schema() -> Token {
    Token::fixed_bytes_from_hex(&format!("0x{}", "00".repeat(32)), 32).unwrap()
}

fn credential_fixture() -> Vec<u8> {
    codec::encode(
        &[
            ParamType::Address,
            ParamType::Bool,
            ParamType::Bool,
            ParamType::Uint(256),
            ParamType::FixedBytes(32),
            ParamType::Uint(256),
        ],
        &[
            Token::Address(address::resolve("0.0.1001").unwrap()),
            Token::Bool(true),
            Token::Bool(false),
            Token::Uint(1_000_000),
            Token::FixedBytes(vec![0x5c; 32]),
            Token::Uint(3),
        ],
    )
    .unwrap()
}

// =========================================================================
// Issue
// =========================================================================

#[tokio::test]
async fn test_issue_for_account_triple() {
    let transport = RecordingTransport::new();
    let client = transport.client();

    let holder = address::resolve("0.0.1234").unwrap();
    assert_eq!(
        holder.to_string(),
        "0x00000000000000000000000000000000000004d2"
    );
    let payload = serde_json::json!({"name": "Alice"});
    let hash = digest::digest(&payload).unwrap();
    assert_eq!(hash, digest::digest(&payload).unwrap());

    let outcome = client
        .execute(
            "issueCredential",
            &[
                Token::Address(holder),
                Token::FixedBytes(hash.as_bytes().to_vec()),
                Token::Uint(0),
                zero_schema(),
            ],
        )
        .await
        .unwrap();
    assert_eq!(outcome.status, "SUCCESS");
    assert_eq!(outcome.transaction_id, "0.0.1001@1700000000.000000001");

    let submitted = transport.submitted();
    assert_eq!(submitted.len(), 1);
    let call = &submitted[0];
    assert_eq!(call.data.function(), "issueCredential");
    assert_eq!(call.contract, address::resolve("0.0.5678").unwrap());

    let args = codec::decode(
        &[
            ParamType::Address,
            ParamType::FixedBytes(32),
            ParamType::Uint(256),
            ParamType::FixedBytes(32),
        ],
        &call.data.as_bytes()[4..],
    )
    .unwrap();
    assert_eq!(args[0], Token::Address(holder));
    assert_eq!(args[1], Token::FixedBytes(hash.as_bytes().to_vec()));
    assert_eq!(args[2], Token::Uint(0));
    assert_eq!(args[3], zero_schema());
}

#[tokio::test]
async fn test_reverted_issue_is_execution_error() {
    let transport = RecordingTransport::new();
    transport.push_receipt(Ok(Receipt {
        transaction_id: "0.0.1001@1700000000.000000002".into(),
        status: "CONTRACT_REVERT_EXECUTED".into(),
    }));
    let client = transport.client();

    let err = client
        .execute(
            "revokeCredential",
            &[
                Token::Address(address::resolve("0.0.1234").unwrap()),
                zero_schema(),
            ],
        )
        .await
        .unwrap_err();

    match err {
        LedgerError::Execution { function, source } => {
            assert_eq!(function, "revokeCredential");
            assert!(source.to_string().contains("CONTRACT_REVERT_EXECUTED"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(transport.submitted().len(), 1);
}

// =========================================================================
// Read-only paths
// =========================================================================

#[tokio::test]
async fn test_verify_missing_credential_is_not_an_error() {
    let transport = RecordingTransport::new();
    transport.push_result(Ok(codec::encode(&[ParamType::Bool], &[Token::Bool(false)]).unwrap()));
    let client = transport.client();

    let outcome = client
        .query(
            "verifyCredential",
            &[
                Token::Address(address::resolve("0.0.1234").unwrap()),
                Token::FixedBytes(vec![0xee; 32]),
            ],
        )
        .await
        .unwrap();
    assert_eq!(outcome.at(0).and_then(Token::as_bool), Some(false));
}

#[tokio::test]
async fn test_get_credential_field_order() {
    let transport = RecordingTransport::new();
    transport.push_result(Ok(credential_fixture()));
    let client = transport.client();

    let outcome = client
        .query(
            "getCredential",
            &[
                Token::Address(address::resolve("0.0.1234").unwrap()),
                zero_schema(),
            ],
        )
        .await
        .unwrap();

    let names: Vec<&str> = outcome.iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        vec!["issuer", "valid", "suspended", "expirationBlock", "schemaId", "version"]
    );
    assert_eq!(outcome.get("expirationBlock"), Some(&Token::Uint(1_000_000)));
    assert_eq!(outcome.get("version").and_then(Token::as_uint), Some(3));
}

#[tokio::test]
async fn test_query_network_failure_is_query_error() {
    let transport = RecordingTransport::new();
    transport.push_result(Err(TransportError::Mirror {
        status: 400,
        message: "CONTRACT_REVERT_EXECUTED".into(),
    }));
    let client = transport.client();

    let err = client.query("paused", &[]).await.unwrap_err();
    assert!(matches!(err, LedgerError::Query { .. }));
}

// =========================================================================
// No network side effects on local errors
// =========================================================================

#[tokio::test]
async fn test_unknown_function_makes_no_request() {
    let transport = RecordingTransport::new();
    let client = transport.client();

    let err = client.execute("nonexistentFn", &[]).await.unwrap_err();
    assert!(matches!(err, LedgerError::Abi(AbiError::UnknownFunction(_))));
    let err = client.query("nonexistentFn", &[]).await.unwrap_err();
    assert!(matches!(err, LedgerError::Abi(AbiError::UnknownFunction(_))));

    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_wrong_arity_makes_no_request() {
    let transport = RecordingTransport::new();
    let client = transport.client();

    let err = client
        .execute("issueCredential", &[Token::Uint(1)])
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Abi(AbiError::ArgumentType(_))));
    assert_eq!(transport.request_count(), 0);
}
