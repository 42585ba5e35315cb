//! `did-cli config`: show or update the local configuration.

use std::path::Path;

use clap::Args;

use hdid_core::{CliConfig, NetworkName};

use super::yes_no;
use crate::reporter::Summary;

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Set network (mainnet/testnet/previewnet).
    #[arg(short, long)]
    pub network: Option<NetworkName>,

    /// Set Hedera account ID.
    #[arg(short, long)]
    pub account_id: Option<String>,

    /// Set private key (use with caution).
    #[arg(short, long)]
    pub private_key: Option<String>,

    /// Set contract ID (0.0.x format) or EVM address.
    #[arg(short, long)]
    pub contract: Option<String>,

    /// Set mirror node URL.
    #[arg(short, long)]
    pub mirror_node: Option<String>,
}

impl ConfigArgs {
    fn is_empty(&self) -> bool {
        self.network.is_none()
            && self.account_id.is_none()
            && self.private_key.is_none()
            && self.contract.is_none()
            && self.mirror_node.is_none()
    }
}

pub fn labels() -> (&'static str, &'static str) {
    ("Updating configuration", "Failed to update configuration")
}

/// Load the file the `config` command edits. A file that fails to load is
/// replaced by defaults so it can be repaired with `did-cli config --...`.
pub fn load_repairable(path: &Path) -> CliConfig {
    CliConfig::load(path).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "config file unreadable, starting from defaults");
        CliConfig::default()
    })
}

/// Apply the given settings and save, or describe the current configuration.
pub fn run(args: &ConfigArgs, config: &mut CliConfig, path: &Path) -> anyhow::Result<Summary> {
    if args.is_empty() {
        return Ok(describe(config));
    }

    let mut summary = Summary::positive("Configuration updated");
    if let Some(network) = args.network {
        config.set_network(network);
        summary = summary.field("Network set to", network);
    }
    if let Some(account_id) = &args.account_id {
        config.set_account_id(account_id)?;
        summary = summary.field("Hedera account ID set to", account_id);
    }
    if let Some(key) = &args.private_key {
        config.set_private_key(key);
        summary = summary.field("Private key", "has been set");
    }
    if let Some(contract) = &args.contract {
        config.set_contract(contract)?;
        summary = summary.field("Contract ID set to", contract);
    }
    if let Some(url) = &args.mirror_node {
        config.network.mirror_node = url.clone();
        summary = summary.field("Mirror node URL set to", url);
    }

    config.save(path)?;
    tracing::info!(path = %path.display(), "configuration saved");
    Ok(summary)
}

fn describe(config: &CliConfig) -> Summary {
    let mut summary = Summary::plain("Current configuration:")
        .field("Network", config.network.name)
        .field("Mirror node", &config.network.mirror_node)
        .field(
            "Hedera account ID",
            config.operator.account_id.as_deref().unwrap_or("Not set"),
        )
        .field(
            "Private key configured",
            yes_no(config.operator.private_key.is_some()),
        );
    if let Some(id) = &config.contract.id {
        summary = summary.field("Contract ID", id);
    }
    if let Some(address) = &config.contract.address {
        summary = summary.field("Contract address", address);
    }
    summary
}
