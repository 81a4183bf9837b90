//! Token ledger server binary

use token_ledger::{Config, Ledger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting token ledger server");

    // Load configuration: file if given, env overrides otherwise
    let config = match std::env::var("TOKEN_LEDGER_CONFIG") {
        Ok(path) => Config::from_file(path)?,
        Err(_) => Config::from_env()?,
    };

    let ledger = Ledger::open(config).await?;
    tracing::info!(owner = %ledger.owner(), "Ledger opened successfully");

    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down token ledger server");
    ledger.shutdown().await?;
    Ok(())
}
