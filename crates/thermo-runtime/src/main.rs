//! # Thermowatch Runtime
//!
//! The main entry point for the Thermowatch backend.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging
//! 2. Load configuration from the environment
//! 3. Connect the PostgreSQL pool and apply the schema
//! 4. Start the gateway service (HTTP + WebSocket + LISTEN loop)
//! 5. Run until Ctrl+C, then shut down gracefully

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use thermo_gateway::storage::PgTemperatureStore;
use thermo_gateway::{GatewayConfig, TemperatureService};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("===========================================");
    info!("  Thermowatch v{}", thermo_gateway::VERSION);
    info!("===========================================");

    // Load configuration
    let config = GatewayConfig::from_env();

    // Connect the pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.connection_url())
        .await
        .context("Failed to connect to PostgreSQL")?;
    info!(
        host = %config.database.host,
        port = config.database.port,
        database = %config.database.name,
        "Connected to PostgreSQL"
    );

    // Apply schema (idempotent)
    PgTemperatureStore::ensure_schema(&pool)
        .await
        .context("Failed to apply database schema")?;

    // Create and start the service
    let mut service =
        TemperatureService::new(config, pool).context("Failed to build temperature service")?;

    // Dropping the server future on Ctrl+C closes the listener and all
    // connections; storage state lives in PostgreSQL.
    tokio::select! {
        result = service.start() => {
            result.context("Service exited with error")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C received, shutting down...");
        }
    }

    info!("Shutdown complete");
    Ok(())
}
