//! dbx GraphQL Connector - Main entrypoint
//!
//! Reads one JSON request per stdin line and writes one response per stdout
//! line. Logs go to stderr.

#![forbid(unsafe_code)]

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dbx_graphql_connector::{ConnectorHost, GraphqlConnectorConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// dbx connector for GraphQL endpoints.
#[derive(Debug, Parser)]
#[command(name = "dbx-graphql-connector", version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &cli.config {
        Some(path) => GraphqlConnectorConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GraphqlConnectorConfig::default(),
    };
    config.apply_env_overrides();

    tracing::info!("dbx GraphQL connector starting");
    run_host_loop(&config)
}

fn run_host_loop(config: &GraphqlConnectorConfig) -> Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut host = ConnectorHost::new(config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = runtime.block_on(host.handle_message(&line));
        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        stdout.flush()?;

        if host.is_shutdown() {
            break;
        }
    }

    Ok(())
}
