//! `did-cli admin`: issuer roles and the contract pause switch.

use clap::Subcommand;

use hdid_ledger::LedgerClient;

use super::{address_token, executed};
use crate::reporter::Summary;

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Grant the issuer role to an address.
    GrantIssuer {
        /// Address or account ID to grant the issuer role to.
        address: String,
    },
    /// Revoke the issuer role from an address.
    RevokeIssuer {
        /// Address or account ID to revoke the issuer role from.
        address: String,
    },
    /// Pause the contract (admin only).
    Pause,
    /// Unpause the contract (admin only).
    Unpause,
}

impl AdminCommand {
    pub fn labels(&self) -> (&'static str, &'static str) {
        match self {
            Self::GrantIssuer { .. } => ("Granting issuer role", "Failed to grant issuer role"),
            Self::RevokeIssuer { .. } => ("Revoking issuer role", "Failed to revoke issuer role"),
            Self::Pause => ("Pausing contract", "Failed to pause contract"),
            Self::Unpause => ("Unpausing contract", "Failed to unpause contract"),
        }
    }
}

pub async fn run(command: &AdminCommand, client: &LedgerClient) -> anyhow::Result<Summary> {
    let (function, args, headline) = match command {
        AdminCommand::GrantIssuer { address } => (
            "grantIssuerRole",
            vec![address_token(address)?],
            "Issuer role granted successfully!",
        ),
        AdminCommand::RevokeIssuer { address } => (
            "revokeIssuerRole",
            vec![address_token(address)?],
            "Issuer role revoked successfully!",
        ),
        AdminCommand::Pause => ("pause", vec![], "Contract paused successfully!"),
        AdminCommand::Unpause => ("unpause", vec![], "Contract unpaused successfully!"),
    };
    let outcome = client.execute(function, &args).await?;
    Ok(executed(headline, outcome))
}
