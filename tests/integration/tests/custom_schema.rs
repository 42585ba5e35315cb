//! Integration test: loading a contract schema from disk instead of the
//! bundled one.

use hdid_abi::{AbiError, ContractInterface, ContractSchema, Token};
use hdid_integration_tests::RecordingTransport;
use hdid_ledger::LedgerError;

const ECHO_ARTIFACT: &str = r#"{
  "contractName": "Echo",
  "abi": [
    {"type": "event", "name": "Echoed", "inputs": [], "anonymous": false},
    {
      "type": "function",
      "name": "echo",
      "stateMutability": "pure",
      "inputs": [{"name": "label", "type": "string"}, {"name": "flag", "type": "bool"}],
      "outputs": [{"name": "label", "type": "string"}, {"name": "flag", "type": "bool"}]
    }
  ]
}"#;

#[tokio::test]
async fn test_artifact_schema_round_trips_through_client() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Echo.json");
    std::fs::write(&path, ECHO_ARTIFACT).unwrap();

    let interface = ContractInterface::new(ContractSchema::load(&path).unwrap());
    let args = [Token::String("hello".into()), Token::Bool(true)];
    let encoded = interface.encode("echo", &args).unwrap();

    let transport = RecordingTransport::new();
    // Echo returns its arguments, ABI-encoded without the selector.
    transport.push_result(Ok(encoded.as_bytes()[4..].to_vec()));
    let client = transport.client_with(interface);

    let outcome = client.query("echo", &args).await.unwrap();
    assert_eq!(outcome.into_tokens(), args.to_vec());
    assert_eq!(transport.called().len(), 1);
}

#[test]
fn test_missing_schema_file_is_schema_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ContractSchema::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, AbiError::SchemaLoad(_)));
}

#[tokio::test]
async fn test_registry_functions_absent_from_custom_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Echo.json");
    std::fs::write(&path, ECHO_ARTIFACT).unwrap();

    let transport = RecordingTransport::new();
    let client = transport.client_with(ContractInterface::new(ContractSchema::load(&path).unwrap()));

    let err = client.execute("pause", &[]).await.unwrap_err();
    assert!(matches!(err, LedgerError::Abi(AbiError::UnknownFunction(_))));
    assert_eq!(transport.request_count(), 0);
}
