//! Out-of-process change listener.
//!
//! A long-lived connection subscribes to the `temperature_changes`
//! NOTIFY channel so that mutations from other processes (or direct
//! database access) still reach this process's live subscribers. The
//! loop never gives up: any listener failure tears the connection down
//! and a fresh one is established after a fixed delay.

use crate::domain::config::ListenerConfig;
use crate::notify::ChangeNotifier;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// LISTEN loop bridging database change signals to the notifier.
pub struct ChangeListener {
    pool: PgPool,
    notifier: ChangeNotifier,
    config: ListenerConfig,
}

impl ChangeListener {
    pub fn new(pool: PgPool, notifier: ChangeNotifier, config: ListenerConfig) -> Self {
        Self {
            pool,
            notifier,
            config,
        }
    }

    /// Run forever. Each connection failure is followed by a fixed
    /// backoff and a reconnect; there is no retry ceiling.
    pub async fn run(self) {
        loop {
            match self.listen_once().await {
                Ok(()) => {
                    // recv() only returns Ok forever or Err; a clean exit
                    // still warrants a fresh connection.
                    warn!(channel = %self.config.channel, "listener stream ended, reconnecting");
                }
                Err(e) => {
                    error!(
                        channel = %self.config.channel,
                        error = %e,
                        delay_secs = self.config.retry_delay.as_secs(),
                        "change listener failed, reconnecting after delay"
                    );
                }
            }
            sleep(self.config.retry_delay).await;
        }
    }

    /// One listener session: connect, LISTEN, forward notifications
    /// until the connection errors.
    async fn listen_once(&self) -> Result<(), sqlx::Error> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(&self.config.channel).await?;
        info!(channel = %self.config.channel, "listening for change signals");

        loop {
            let notification = listener.recv().await?;
            tracing::debug!(
                channel = notification.channel(),
                payload = notification.payload(),
                "change signal received"
            );
            self.notifier.notify_change().await;
        }
    }
}
