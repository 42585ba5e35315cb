//! `did-cli credential`: issue and manage verifiable credentials.

use anyhow::Context as _;
use clap::{Args, Subcommand};

use hdid_abi::Token;
use hdid_ledger::LedgerClient;

use super::{address_token, bool_field, bytes32_token, executed, yes_no, HolderHashArgs, PayloadArgs};
use crate::reporter::Summary;

const ZERO_SCHEMA: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

/// Validity window and schema of a credential.
#[derive(Args, Debug, Clone)]
pub struct TermsArgs {
    /// Duration in blocks (0 for no expiration).
    #[arg(short = 't', long, default_value_t = 0)]
    pub duration: u128,

    /// Schema ID for the credential (bytes32, hex).
    #[arg(short, long, default_value = ZERO_SCHEMA)]
    pub schema: String,
}

#[derive(Subcommand, Debug)]
pub enum CredentialCommand {
    /// Issue a new credential.
    Issue {
        /// Address or account ID of the holder.
        holder: String,
        #[command(flatten)]
        payload: PayloadArgs,
        #[command(flatten)]
        terms: TermsArgs,
    },
    /// Revoke a credential.
    Revoke(HolderHashArgs),
    /// Suspend a credential.
    Suspend(HolderHashArgs),
    /// Lift a credential suspension.
    Unsuspend(HolderHashArgs),
    /// Update a credential's duration and schema.
    Update {
        #[command(flatten)]
        target: HolderHashArgs,
        #[command(flatten)]
        terms: TermsArgs,
    },
    /// Get credential information.
    Get(HolderHashArgs),
    /// Verify a credential.
    Verify(HolderHashArgs),
}

impl CredentialCommand {
    pub fn labels(&self) -> (&'static str, &'static str) {
        match self {
            Self::Issue { .. } => ("Issuing credential", "Failed to issue credential"),
            Self::Revoke(_) => ("Revoking credential", "Failed to revoke credential"),
            Self::Suspend(_) => ("Suspending credential", "Failed to suspend credential"),
            Self::Unsuspend(_) => ("Unsuspending credential", "Failed to unsuspend credential"),
            Self::Update { .. } => ("Updating credential", "Failed to update credential"),
            Self::Get(_) => (
                "Getting credential information",
                "Failed to get credential information",
            ),
            Self::Verify(_) => ("Verifying credential", "Failed to verify credential"),
        }
    }
}

pub async fn run(command: &CredentialCommand, client: &LedgerClient) -> anyhow::Result<Summary> {
    match command {
        CredentialCommand::Issue {
            holder,
            payload,
            terms,
        } => {
            let hash = payload.digest()?;
            let args = [
                address_token(holder)?,
                Token::FixedBytes(hash.as_bytes().to_vec()),
                Token::Uint(terms.duration),
                bytes32_token(&terms.schema)?,
            ];
            let outcome = client.execute("issueCredential", &args).await?;
            Ok(executed("Credential issued successfully!", outcome).field("Credential hash", hash))
        }
        CredentialCommand::Revoke(target) => {
            let outcome = client.execute("revokeCredential", &target.tokens()?).await?;
            Ok(executed("Credential revoked successfully!", outcome))
        }
        CredentialCommand::Suspend(target) => {
            let outcome = client.execute("suspendCredential", &target.tokens()?).await?;
            Ok(executed("Credential suspended successfully!", outcome))
        }
        CredentialCommand::Unsuspend(target) => {
            let outcome = client.execute("unsuspendCredential", &target.tokens()?).await?;
            Ok(executed("Credential unsuspended successfully!", outcome))
        }
        CredentialCommand::Update { target, terms } => {
            let [holder, hash] = target.tokens()?;
            let args = [
                holder,
                hash,
                Token::Uint(terms.duration),
                bytes32_token(&terms.schema)?,
            ];
            let outcome = client.execute("updateCredential", &args).await?;
            Ok(executed("Credential updated successfully!", outcome))
        }
        CredentialCommand::Get(target) => {
            let info = client.query("getCredential", &target.tokens()?).await?;
            let field = |name: &str| {
                info.get(name)
                    .with_context(|| format!("getCredential returned no '{}'", name))
            };
            Ok(Summary::positive("Credential information:")
                .field("Issuer", field("issuer")?)
                .field("Valid", yes_no(bool_field(&info, 1)?))
                .field("Suspended", yes_no(bool_field(&info, 2)?))
                .field("Expiration Block", field("expirationBlock")?)
                .field("Schema ID", field("schemaId")?)
                .field("Version", field("version")?))
        }
        CredentialCommand::Verify(target) => {
            let result = client.query("verifyCredential", &target.tokens()?).await?;
            if bool_field(&result, 0)? {
                Ok(Summary::positive("Credential is valid"))
            } else {
                Ok(Summary::warning("Credential is not valid"))
            }
        }
    }
}
