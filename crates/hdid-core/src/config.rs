//! Local configuration store.
//!
//! A single TOML file holds the network selection, operator credentials and
//! the registry contract. It is read at start and rewritten only by the
//! `config` command; concurrent writers are last-writer-wins.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::address::{self, AccountTriple, CanonicalAddress, Identifier};
use crate::error::CoreError;

/// Hedera networks with built-in endpoint presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkName {
    Mainnet,
    Testnet,
    Previewnet,
}

impl NetworkName {
    /// Public mirror node REST endpoint.
    pub fn mirror_node(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://mainnet-public.mirrornode.hedera.com",
            Self::Testnet => "https://testnet.mirrornode.hedera.com",
            Self::Previewnet => "https://previewnet.mirrornode.hedera.com",
        }
    }

    /// gRPC-web proxy in front of the first consensus node.
    pub fn node_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://node00-00-grpc.swirldslabs.com:443",
            Self::Testnet => "https://testnet-node00-00-grpc.hedera.com:443",
            Self::Previewnet => "https://previewnet-node00-00-grpc.hedera.com:443",
        }
    }

    /// Account id of the node behind [`Self::node_url`].
    pub fn node_account_id(&self) -> &'static str {
        "0.0.3"
    }
}

impl fmt::Display for NetworkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Testnet => write!(f, "testnet"),
            Self::Previewnet => write!(f, "previewnet"),
        }
    }
}

impl FromStr for NetworkName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "previewnet" => Ok(Self::Previewnet),
            other => Err(CoreError::Config(format!(
                "unknown network '{}' (expected mainnet, testnet or previewnet)",
                other
            ))),
        }
    }
}

/// Full configuration for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Network selection and endpoints.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Operator (payer and signer) credentials.
    #[serde(default)]
    pub operator: OperatorConfig,

    /// Registry contract.
    #[serde(default)]
    pub contract: ContractConfig,

    /// Transaction parameters.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network name.
    #[serde(default = "default_network")]
    pub name: NetworkName,
    /// Mirror node base URL, used for read-only calls.
    #[serde(default = "default_mirror_node")]
    pub mirror_node: String,
    /// gRPC-web endpoint of the consensus node transactions are sent to.
    #[serde(default = "default_node_url")]
    pub node_url: String,
    /// Account id of that consensus node.
    #[serde(default = "default_node_account_id")]
    pub node_account_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OperatorConfig {
    /// Operator account id (`shard.realm.num`).
    #[serde(default)]
    pub account_id: Option<String>,
    /// Operator Ed25519 private key, hex (raw or DER).
    #[serde(default)]
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContractConfig {
    /// Contract id (`shard.realm.num`), when configured in that notation.
    #[serde(default)]
    pub id: Option<String>,
    /// Contract EVM address.
    #[serde(default)]
    pub address: Option<String>,
    /// Alternative contract schema (ABI JSON); the bundled schema is used when unset.
    #[serde(default)]
    pub abi_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Gas limit for contract calls.
    #[serde(default = "default_gas")]
    pub gas: u64,
    /// Maximum transaction fee in tinybars.
    #[serde(default = "default_max_fee")]
    pub max_fee_tinybars: u64,
    /// Number of receipt polls before giving up.
    #[serde(default = "default_receipt_polls")]
    pub receipt_polls: u32,
    /// Delay between receipt polls in milliseconds.
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
}

fn default_network() -> NetworkName {
    NetworkName::Testnet
}
fn default_mirror_node() -> String {
    default_network().mirror_node().into()
}
fn default_node_url() -> String {
    default_network().node_url().into()
}
fn default_node_account_id() -> String {
    default_network().node_account_id().into()
}
fn default_gas() -> u64 {
    300_000
}
fn default_max_fee() -> u64 {
    // 20 hbar
    2_000_000_000
}
fn default_receipt_polls() -> u32 {
    40
}
fn default_receipt_poll_ms() -> u64 {
    500
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: default_network(),
            mirror_node: default_mirror_node(),
            node_url: default_node_url(),
            node_account_id: default_node_account_id(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            gas: default_gas(),
            max_fee_tinybars: default_max_fee(),
            receipt_polls: default_receipt_polls(),
            receipt_poll_ms: default_receipt_poll_ms(),
        }
    }
}

impl CliConfig {
    /// `$HOME/.config/hdid/config.toml`, or `./hdid.toml` without a home directory.
    pub fn default_path() -> PathBuf {
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".config").join("hdid").join("config.toml"),
            None => PathBuf::from("hdid.toml"),
        }
    }

    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)
                .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, contents)?;
        tracing::debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Switch network and reset its endpoints to the preset.
    pub fn set_network(&mut self, name: NetworkName) {
        self.network = NetworkConfig {
            name,
            mirror_node: name.mirror_node().into(),
            node_url: name.node_url().into(),
            node_account_id: name.node_account_id().into(),
        };
    }

    /// Set the operator account id; must be a `shard.realm.num` triple.
    pub fn set_account_id(&mut self, account_id: &str) -> Result<(), CoreError> {
        let triple: AccountTriple = account_id.parse()?;
        self.operator.account_id = Some(triple.to_string());
        Ok(())
    }

    pub fn set_private_key(&mut self, key: &str) {
        self.operator.private_key = Some(key.trim().to_string());
    }

    /// Set the contract from either notation.
    pub fn set_contract(&mut self, identifier: &str) -> Result<(), CoreError> {
        let resolved = address::resolve(identifier)?;
        self.contract.id = match Identifier::parse(identifier)? {
            Identifier::LedgerNativeTriple(triple) => Some(triple.to_string()),
            Identifier::HexAddress(_) => None,
        };
        self.contract.address = Some(resolved.to_string());
        Ok(())
    }

    pub fn operator_account(&self) -> Result<AccountTriple, CoreError> {
        self.operator
            .account_id
            .as_deref()
            .ok_or_else(|| {
                CoreError::Config("operator account id not set, run `did-cli config --account-id`".into())
            })?
            .parse()
    }

    pub fn operator_key(&self) -> Result<&str, CoreError> {
        self.operator.private_key.as_deref().ok_or_else(|| {
            CoreError::Config("private key not set, run `did-cli config --private-key`".into())
        })
    }

    /// Contract id as a triple, when configured in that notation.
    pub fn contract_triple(&self) -> Result<Option<AccountTriple>, CoreError> {
        self.contract.id.as_deref().map(str::parse).transpose()
    }

    pub fn contract_address(&self) -> Result<CanonicalAddress, CoreError> {
        match (&self.contract.address, &self.contract.id) {
            (Some(addr), _) => address::resolve(addr),
            (None, Some(id)) => address::resolve(id),
            (None, None) => Err(CoreError::Config(
                "contract not set, run `did-cli config --contract`".into(),
            )),
        }
    }

    pub fn node_account(&self) -> Result<AccountTriple, CoreError> {
        self.network.node_account_id.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.network.name, NetworkName::Testnet);
        assert_eq!(config.network.mirror_node, "https://testnet.mirrornode.hedera.com");
        assert_eq!(config.ledger.gas, 300_000);
        assert!(config.operator.account_id.is_none());
        assert!(config.contract.abi_path.is_none());
    }

    #[test]
    fn test_config_from_toml_partial() {
        let toml_str = r#"
[operator]
account_id = "0.0.1001"

[ledger]
gas = 500000
"#;
        let config: CliConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.operator_account().unwrap(), AccountTriple::new(0, 0, 1001));
        assert_eq!(config.ledger.gas, 500_000);
        // Defaults for unspecified
        assert_eq!(config.ledger.receipt_polls, 40);
        assert_eq!(config.network.node_account_id, "0.0.3");
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = CliConfig::default();
        config.set_network(NetworkName::Mainnet);
        config.set_account_id("0.0.42").unwrap();
        config.set_private_key("  abcd  ");
        config.save(&path).unwrap();

        let loaded = CliConfig::load(&path).unwrap();
        assert_eq!(loaded.network.name, NetworkName::Mainnet);
        assert_eq!(loaded.network.mirror_node, NetworkName::Mainnet.mirror_node());
        assert_eq!(loaded.operator.account_id.as_deref(), Some("0.0.42"));
        assert_eq!(loaded.operator_key().unwrap(), "abcd");
    }

    #[test]
    fn test_load_nonexistent_uses_defaults() {
        let config = CliConfig::load(Path::new("/nonexistent/hdid/config.toml")).unwrap();
        assert_eq!(config.network.name, NetworkName::Testnet);
    }

    #[test]
    fn test_load_malformed_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[network\nname = ").unwrap();
        assert!(matches!(CliConfig::load(&path), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_set_contract_triple_records_both_forms() {
        let mut config = CliConfig::default();
        config.set_contract("0.0.5678").unwrap();
        assert_eq!(config.contract.id.as_deref(), Some("0.0.5678"));
        assert_eq!(
            config.contract.address.as_deref(),
            Some("0x000000000000000000000000000000000000162e")
        );
        assert_eq!(
            config.contract_triple().unwrap(),
            Some(AccountTriple::new(0, 0, 5678))
        );
    }

    #[test]
    fn test_set_contract_hex_clears_id() {
        let mut config = CliConfig::default();
        config.set_contract("0.0.5678").unwrap();
        config
            .set_contract("ab5801a7d398351b8be11c439e05c5b3259aec9b")
            .unwrap();
        assert!(config.contract.id.is_none());
        assert_eq!(
            config.contract_address().unwrap().to_string(),
            "0xab5801a7d398351b8be11c439e05c5b3259aec9b"
        );
    }

    #[test]
    fn test_missing_values_are_config_errors() {
        let config = CliConfig::default();
        assert!(matches!(config.operator_account(), Err(CoreError::Config(_))));
        assert!(matches!(config.operator_key(), Err(CoreError::Config(_))));
        assert!(matches!(config.contract_address(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_network_name_parse() {
        assert_eq!("MAINNET".parse::<NetworkName>().unwrap(), NetworkName::Mainnet);
        assert!(matches!(
            "devnet".parse::<NetworkName>(),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_account_id_rejected() {
        let mut config = CliConfig::default();
        assert!(matches!(
            config.set_account_id("alice"),
            Err(CoreError::InvalidIdentifier { .. })
        ));
    }
}
