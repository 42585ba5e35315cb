//! did-cli: manage DIDs, verifiable credentials and presentations on a
//! Hedera smart contract registry.
//!
//! Subcommands: did, credential, presentation, admin, config.

mod commands;
mod reporter;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hdid_core::CliConfig;

use commands::{
    admin::AdminCommand, config::ConfigArgs, credential::CredentialCommand, did::DidCommand,
    presentation::PresentationCommand,
};
use reporter::{Reporter, Summary};

/// CLI tool for DID management on Hedera.
#[derive(Parser, Debug)]
#[command(name = "did-cli", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// DID management commands.
    #[command(subcommand)]
    Did(DidCommand),
    /// Credential management commands.
    #[command(subcommand)]
    Credential(CredentialCommand),
    /// Presentation management commands.
    #[command(subcommand)]
    Presentation(PresentationCommand),
    /// Admin management commands.
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Configure CLI settings.
    Config(ConfigArgs),
}

impl Commands {
    fn labels(&self) -> (&'static str, &'static str) {
        match self {
            Self::Did(cmd) => cmd.labels(),
            Self::Credential(cmd) => cmd.labels(),
            Self::Presentation(cmd) => cmd.labels(),
            Self::Admin(cmd) => cmd.labels(),
            Self::Config(_) => commands::config::labels(),
        }
    }
}

async fn dispatch(command: &Commands, config_path: &Path) -> anyhow::Result<Summary> {
    match command {
        Commands::Config(args) => {
            let mut config = commands::config::load_repairable(config_path);
            commands::config::run(args, &mut config, config_path)
        }
        Commands::Did(cmd) => {
            let config = CliConfig::load(config_path)?;
            let client = commands::ledger_client(&config)?;
            commands::did::run(cmd, &client, &config).await
        }
        Commands::Credential(cmd) => {
            let client = commands::ledger_client(&CliConfig::load(config_path)?)?;
            commands::credential::run(cmd, &client).await
        }
        Commands::Presentation(cmd) => {
            let client = commands::ledger_client(&CliConfig::load(config_path)?)?;
            commands::presentation::run(cmd, &client).await
        }
        Commands::Admin(cmd) => {
            let client = commands::ledger_client(&CliConfig::load(config_path)?)?;
            commands::admin::run(cmd, &client).await
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(CliConfig::default_path);
    let (progress, failure) = cli.command.labels();

    let mut reporter = Reporter::stdio();
    let pending = reporter.start(progress);

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(dispatch(&cli.command, &config_path)));

    let outcome = match result {
        Ok(summary) => pending.succeed(summary),
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            pending.fail(failure, &err)
        }
    };
    ExitCode::from(outcome.exit_code())
}
