//! Temperature service - main entry point.
//!
//! Wires the storage gateway, subscriber registry, change notifier, and
//! HTTP/WebSocket router together and runs the server.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::http::routes::{router, AppState};
use crate::notify::ChangeListener;
use crate::storage::{PgTemperatureStore, TemperatureStore};
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Temperature service state
pub struct TemperatureService {
    config: GatewayConfig,
    state: AppState,
    /// Present when backed by PostgreSQL; drives the LISTEN loop.
    pool: Option<PgPool>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TemperatureService {
    /// Create a service backed by PostgreSQL.
    pub fn new(config: GatewayConfig, pool: PgPool) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let store: Arc<dyn TemperatureStore> = Arc::new(PgTemperatureStore::new(
            pool.clone(),
            config.listener.channel.clone(),
        ));
        let state = AppState::new(store, config.production);

        Ok(Self {
            config,
            state,
            pool: Some(pool),
            shutdown_tx: None,
        })
    }

    /// Create a service over an injected store (tests, demos). No
    /// LISTEN loop runs; there is no out-of-process signal source.
    pub fn with_store(
        config: GatewayConfig,
        store: Arc<dyn TemperatureStore>,
    ) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let state = AppState::new(store, config.production);
        Ok(Self {
            config,
            state,
            pool: None,
            shutdown_tx: None,
        })
    }

    /// Start the server and the change listener; runs until shutdown.
    pub async fn start(&mut self) -> Result<(), GatewayError> {
        info!("Starting temperature service...");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        // Out-of-process change signals: one eternal LISTEN task.
        if let Some(pool) = &self.pool {
            let listener = ChangeListener::new(
                pool.clone(),
                self.state.notifier.clone(),
                self.config.listener.clone(),
            );
            tokio::spawn(listener.run());
        }

        let app = self.build_router();
        let addr = self.config.http_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(e.to_string()))?;

        info!(addr = %addr, "HTTP server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
                info!("Received shutdown signal");
            })
            .await
            .map_err(|e| GatewayError::Bind(e.to_string()))?;

        info!("Temperature service stopped");
        Ok(())
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Shared application state (handler wiring, tests)
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    fn build_router(&self) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        router(self.state.clone()).layer(middleware)
    }
}
