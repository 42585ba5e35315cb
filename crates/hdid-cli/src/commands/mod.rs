//! Command handlers. Each handler turns its arguments into contract calls
//! and returns a [`Summary`] for the reporter.

pub mod admin;
pub mod config;
pub mod credential;
pub mod did;
pub mod presentation;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Args;

use hdid_abi::{ContractInterface, ContractSchema, QueryOutcome, Token};
use hdid_core::{address, digest, CliConfig};
use hdid_ledger::{ExecutionOutcome, HederaTransport, LedgerClient};

use crate::reporter::Summary;

/// Build a ledger client from the loaded configuration.
pub fn ledger_client(config: &CliConfig) -> anyhow::Result<LedgerClient> {
    let schema = match &config.contract.abi_path {
        Some(path) => ContractSchema::load(path)?,
        None => ContractSchema::bundled()?,
    };
    tracing::debug!(functions = schema.len(), "contract schema loaded");

    let contract = config.contract_address()?;
    let transport = HederaTransport::from_config(config)?;
    Ok(LedgerClient::new(
        Arc::new(ContractInterface::new(schema)),
        Box::new(transport),
        contract,
    )
    .with_gas(config.ledger.gas))
}

/// `--data` / `--file` payload options, hashed into a `bytes32` token.
#[derive(Args, Debug, Clone, Default)]
pub struct PayloadArgs {
    /// Data as a JSON string.
    #[arg(short, long)]
    pub data: Option<String>,

    /// Path to a JSON file containing the data.
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl PayloadArgs {
    /// Keccak-256 of the payload's JSON serialization.
    pub fn digest(&self) -> anyhow::Result<digest::ContentDigest> {
        let value = digest::read_payload(self.data.as_deref(), self.file.as_deref())?;
        Ok(digest::digest(&value)?)
    }
}

/// Holder/hash pair shared by the credential and presentation commands.
#[derive(Args, Debug, Clone)]
pub struct HolderHashArgs {
    /// Address or account ID of the holder.
    pub holder: String,

    /// Hash (bytes32, hex).
    pub hash: String,
}

impl HolderHashArgs {
    pub fn tokens(&self) -> anyhow::Result<[Token; 2]> {
        Ok([address_token(&self.holder)?, bytes32_token(&self.hash)?])
    }
}

pub(crate) fn address_token(identifier: &str) -> anyhow::Result<Token> {
    Ok(Token::Address(address::resolve(identifier)?))
}

pub(crate) fn bytes32_token(hex: &str) -> anyhow::Result<Token> {
    Ok(Token::fixed_bytes_from_hex(hex, 32)?)
}

pub(crate) fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

pub(crate) fn executed(headline: &str, outcome: ExecutionOutcome) -> Summary {
    Summary::positive(headline)
        .field("Transaction ID", outcome.transaction_id)
        .field("Status", outcome.status)
}

pub(crate) fn bool_field(outcome: &QueryOutcome, index: usize) -> anyhow::Result<bool> {
    outcome
        .at(index)
        .and_then(Token::as_bool)
        .with_context(|| format!("expected a bool at output {}", index))
}
