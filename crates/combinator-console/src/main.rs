//! Combinator Console - terminal front-end for the Combinator platform.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use combinator_auth::{CredentialStore, FileStore, SigningScheme};
use combinator_client::{ClientConfig, ConsoleClient, SigningPolicy};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod format;
mod repl;
mod terminal;

/// Combinator - manage databases, KV stores, workers and domains
#[derive(Parser, Debug)]
#[command(name = "combinator")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file (default: <config dir>/combinator/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Platform API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Request-signing scheme (hmac or rsa)
    #[arg(long)]
    scheme: Option<SigningScheme>,

    /// Directory holding persisted credentials
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Refuse mutating requests that cannot be signed
    #[arg(long)]
    fail_closed: bool,

    /// Keep credentials in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Write the effective settings back to the config file
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn config(&self) -> ClientConfig {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load_from(path),
            None => ClientConfig::load(),
        };

        if let Some(url) = &self.base_url {
            config.base_url.clone_from(url);
        }
        if let Some(scheme) = self.scheme {
            config.scheme = scheme;
        }
        if let Some(dir) = &self.state_dir {
            config.state_dir = Some(dir.clone());
        }
        if self.fail_closed {
            config.policy = SigningPolicy::FailClosed;
        }
        config
    }

    fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(ClientConfig::config_path)
    }

    /// Persists `config` when `--save-config` is given.
    fn persist(&self, config: &ClientConfig) -> anyhow::Result<Option<PathBuf>> {
        if !self.save_config {
            return Ok(None);
        }
        let path = self
            .config_path()
            .context("Could not determine config directory")?;
        config.save_to(&path).map_err(anyhow::Error::msg)?;
        Ok(Some(path))
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "combinator_console={log_level},combinator_client={log_level},combinator_auth={log_level}"
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.config();
    if let Some(path) = cli.persist(&config)? {
        println!("Saved configuration to {}", path.display());
    }
    tracing::info!(
        base_url = %config.base_url,
        scheme = %config.scheme,
        policy = ?config.policy,
        "Starting console"
    );

    let store = match config.resolved_state_dir() {
        Some(dir) if !cli.ephemeral => {
            tracing::debug!(?dir, "Using file credential store");
            CredentialStore::new(FileStore::new(dir), config.scheme)
        }
        _ => {
            if !cli.ephemeral {
                tracing::warn!("Could not determine data directory, credentials will not persist");
            }
            CredentialStore::in_memory(config.scheme)
        }
    };
    let restored = store.load();

    let client =
        ConsoleClient::new(&config, Arc::new(store)).context("Failed to create API client")?;
    let mut term = terminal::StdioTerminal::new();
    repl::run(&client, &mut term, restored).await;
    Ok(())
}
