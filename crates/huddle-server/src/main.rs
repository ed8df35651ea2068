//! # Huddle Server
//!
//! Real-time fantasy football draft server.
//!
//! ## Usage
//!
//! ```bash
//! # Run with default settings (players.json, public/, port 3001)
//! huddle
//!
//! # Run with a config file
//! HUDDLE_CONFIG=/path/to/huddle.toml huddle
//!
//! # Run with environment variables
//! HUDDLE_PORT=8080 HUDDLE_HOST=0.0.0.0 huddle
//! ```

use anyhow::{Context, Result};
use huddle_core::PlayerCatalog;
use huddle_server::{config, handlers, metrics};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "huddle_core=debug,huddle_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::load()?;

    let catalog = PlayerCatalog::load(&config.players_path)
        .with_context(|| format!("Failed to load players from {}", config.players_path))?;

    tracing::info!("Starting Huddle server on {}:{}", config.host, config.port);

    // Initialize metrics
    metrics::init_metrics();

    // Start the server
    handlers::run_server(config, catalog).await?;

    Ok(())
}
