use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use climate_api::{AppState, ClimateApiConfig, SqliteClimateStore, logging, web};

/// Read-only JSON API over the Hawaii climate dataset
#[derive(Debug, Parser)]
#[command(name = "climate-api", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overrides the configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite URL of the dataset, overrides the configuration
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ClimateApiConfig::load_from_path(cli.config)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    config.validate()?;

    logging::init(&config.logging)?;
    tracing::info!(version = climate_api::VERSION, "Starting climate API");

    let store = SqliteClimateStore::connect(&config.database)
        .await
        .with_context(|| format!("Failed to open dataset {}", config.database.url))?;

    let state = AppState::new(Arc::new(store.clone()));
    let served = web::run(state, &config.server).await;

    store.close().await;
    served
}
