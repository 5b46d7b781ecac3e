//! Travel Bot server binary.
//!
//! Reads configuration from flags and environment (a `.env` file in the
//! working directory is loaded first), builds the Azure-backed clients once
//! and serves the recommendation endpoint.
//!
//! ```bash
//! OPENAI_ENDPOINT=... OPENAI_KEY=... VISION_ENDPOINT=... VISION_KEY=... \
//! COSMOS_ENDPOINT=... COSMOS_KEY=... travel-bot --port 3000
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use travel_recommender::config::AppConfig;
use travel_recommender::server::TravelServer;

/// Setup logging with the specified level
fn setup_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    let dotenv_path = dotenv::dotenv().ok();

    let config = AppConfig::parse();
    setup_logging(&config.log_level);

    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }
    info!(
        version = travel_recommender::VERSION,
        deployment = %config.openai_deployment,
        database = %config.cosmos_database,
        container = %config.cosmos_container,
        "Starting Travel Bot"
    );

    let recommender = config
        .build_recommender()
        .context("Failed to initialize external service clients")?;

    let server = TravelServer::new(config.server_config(), Arc::new(recommender));
    server.run().await.context("Server terminated with an error")?;

    Ok(())
}
