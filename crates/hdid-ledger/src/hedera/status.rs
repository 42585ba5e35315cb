//! Hedera `ResponseCodeEnum` values the client cares about.

pub const OK: i32 = 0;
pub const BUSY: i32 = 12;
pub const RECEIPT_NOT_FOUND: i32 = 18;
pub const UNKNOWN: i32 = 21;
pub const SUCCESS: i32 = 22;

const NAMES: &[&str] = &[
    "OK",
    "INVALID_TRANSACTION",
    "PAYER_ACCOUNT_NOT_FOUND",
    "INVALID_NODE_ACCOUNT",
    "TRANSACTION_EXPIRED",
    "INVALID_TRANSACTION_START",
    "INVALID_TRANSACTION_DURATION",
    "INVALID_SIGNATURE",
    "MEMO_TOO_LONG",
    "INSUFFICIENT_TX_FEE",
    "INSUFFICIENT_PAYER_BALANCE",
    "DUPLICATE_TRANSACTION",
    "BUSY",
    "NOT_SUPPORTED",
    "INVALID_FILE_ID",
    "INVALID_ACCOUNT_ID",
    "INVALID_CONTRACT_ID",
    "INVALID_TRANSACTION_ID",
    "RECEIPT_NOT_FOUND",
    "RECORD_NOT_FOUND",
    "INVALID_SOLIDITY_ID",
    "UNKNOWN",
    "SUCCESS",
    "FAIL_INVALID",
    "FAIL_FEE",
    "FAIL_BALANCE",
    "KEY_REQUIRED",
    "BAD_ENCODING",
    "INSUFFICIENT_ACCOUNT_BALANCE",
    "INVALID_SOLIDITY_ADDRESS",
    "INSUFFICIENT_GAS",
    "CONTRACT_SIZE_LIMIT_EXCEEDED",
    "LOCAL_CALL_MODIFICATION_EXCEPTION",
    "CONTRACT_REVERT_EXECUTED",
    "CONTRACT_EXECUTION_EXCEPTION",
];

/// Symbolic name of a response code, or `STATUS_<n>` for codes not listed.
pub fn name(code: i32) -> String {
    usize::try_from(code)
        .ok()
        .and_then(|i| NAMES.get(i))
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("STATUS_{}", code))
}

/// The node has not reached a final answer yet; ask again.
pub fn is_pending(code: i32) -> bool {
    matches!(code, BUSY | RECEIPT_NOT_FOUND | UNKNOWN)
}
