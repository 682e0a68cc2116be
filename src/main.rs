// ABOUTME: Entry point for the petstore binary.
// ABOUTME: Parses CLI arguments, initializes tracing, resolves the store provider, and runs the server.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use petstore_core::Config;
use petstore_server::{Server, forward_os_signals};
use petstore_store::ProviderRegistry;

const DEFAULT_CONFIG_PATH: &str = "config/default.json";

/// Pet record service with pluggable storage backends.
#[derive(Parser, Debug)]
#[command(name = "petstore")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "petstore=info,tower_http=info",
        1 => "petstore=debug,tower_http=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .init();

    run(&cli.config).await
}

async fn run(config_path: &Path) -> anyhow::Result<()> {
    tracing::info!("loading config from {}", config_path.display());
    let config = Config::load(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    tracing::info!("config loaded");

    let registry = ProviderRegistry::with_defaults();
    let store = registry
        .resolve(&config.store)
        .with_context(|| format!("known providers: {:?}", registry.names()))?;

    tracing::info!(
        "petstore v{} using store {}",
        env!("CARGO_PKG_VERSION"),
        config.store.name
    );
    let server = Server::new(config.server, store);
    let _signals = forward_os_signals(server.handle());

    let errors = server.start().await;
    if errors.is_empty() {
        return Ok(());
    }
    for error in &errors {
        tracing::error!("{}", error);
    }
    anyhow::bail!("server stopped with {} error(s)", errors.len())
}
