//! `did-cli did`: create, update and look up DIDs.

use anyhow::Context as _;
use clap::Subcommand;

use hdid_abi::Token;
use hdid_core::CliConfig;
use hdid_ledger::LedgerClient;

use super::{address_token, bool_field, executed};
use crate::reporter::Summary;

#[derive(Subcommand, Debug)]
pub enum DidCommand {
    /// Create a new DID.
    Create {
        /// Public key for the DID.
        public_key: String,
    },
    /// Update an existing DID.
    Update {
        /// New public key for the DID.
        new_public_key: String,
    },
    /// Get DID information.
    Get {
        /// DID address (defaults to your account).
        address: Option<String>,
    },
}

impl DidCommand {
    pub fn labels(&self) -> (&'static str, &'static str) {
        match self {
            Self::Create { .. } => ("Creating DID", "Failed to create DID"),
            Self::Update { .. } => ("Updating DID", "Failed to update DID"),
            Self::Get { .. } => ("Fetching DID information", "Failed to get DID information"),
        }
    }
}

pub async fn run(
    command: &DidCommand,
    client: &LedgerClient,
    config: &CliConfig,
) -> anyhow::Result<Summary> {
    match command {
        DidCommand::Create { public_key } => {
            let outcome = client
                .execute("createDID", &[Token::String(public_key.clone())])
                .await?;
            let holder = config.operator_account()?;
            Ok(executed("DID created successfully!", outcome).field("DID holder", holder))
        }
        DidCommand::Update { new_public_key } => {
            let outcome = client
                .execute("updateDID", &[Token::String(new_public_key.clone())])
                .await?;
            Ok(executed("DID updated successfully!", outcome))
        }
        DidCommand::Get { address } => {
            let address = match address {
                Some(a) => a.clone(),
                None => config.operator_account()?.to_string(),
            };
            let info = client.query("dids", &[address_token(&address)?]).await?;

            if bool_field(&info, 1)? {
                let public_key = info
                    .at(0)
                    .and_then(Token::as_str)
                    .context("expected a string public key")?;
                Ok(Summary::positive(format!("DID exists for address: {}", address))
                    .field("Public key", public_key))
            } else {
                Ok(Summary::warning(format!("No DID found for address: {}", address)))
            }
        }
    }
}
