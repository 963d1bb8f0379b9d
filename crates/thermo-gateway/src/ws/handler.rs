//! WebSocket connection lifecycle.
//!
//! On upgrade a freshly-computed snapshot is queued as the welcome
//! frame and the connection is then registered. A writer task owns
//! the socket sink and drains the connection's outbound queue, which
//! preserves per-connection send order across welcome and broadcasts.
//! The read side only watches for close and errors; clients send no
//! protocol messages.

use crate::snapshot::compute_snapshot;
use crate::storage::TemperatureStore;
use crate::ws::frame::DataFrame;
use crate::ws::registry::{ConnectionId, SubscriberRegistry};
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Handler for one live connection.
pub struct WsConnection {
    registry: Arc<SubscriberRegistry>,
    store: Arc<dyn TemperatureStore>,
    connection_id: ConnectionId,
}

impl WsConnection {
    pub fn new(registry: Arc<SubscriberRegistry>, store: Arc<dyn TemperatureStore>) -> Self {
        Self {
            registry,
            store,
            connection_id: ConnectionId::new(),
        }
    }

    /// Drive the connection until it closes or fails.
    pub async fn handle(self, socket: WebSocket) {
        info!(connection_id = %self.connection_id, "new live subscriber connected");

        let (mut sink, mut stream) = socket.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

        // Writer task: sole owner of the sink. Exits when the queue
        // closes (unregister drops the sender) or a send fails.
        let writer_id = self.connection_id;
        let writer = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = sink.send(message).await {
                    debug!(connection_id = %writer_id, error = %e, "socket send failed");
                    break;
                }
            }
        });

        self.attach(&tx).await;

        // Read loop: receive-only protocol, so inbound traffic is only
        // pings and the close handshake.
        while let Some(result) = stream.next().await {
            match result {
                Ok(Message::Ping(data)) => {
                    if tx.send(Message::Pong(data)).is_err() {
                        break;
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!(connection_id = %self.connection_id, "close frame received");
                    break;
                }
                Ok(_) => {
                    // Text/Binary/Pong: ignored, no client protocol defined
                }
                Err(e) => {
                    warn!(connection_id = %self.connection_id, error = %e, "socket error");
                    break;
                }
            }
        }

        // Cleanup on every exit path; unregister is idempotent.
        self.registry.unregister(&self.connection_id);
        drop(tx);
        writer.abort();

        info!(connection_id = %self.connection_id, "live subscriber disconnected");
    }

    /// Enqueue the welcome frame, then expose the connection to
    /// broadcasts. The welcome must enter the queue before the first
    /// broadcast can; registering first would let a frame built from
    /// newer state precede the welcome on the same connection. A
    /// failed welcome is logged and the connection is registered
    /// anyway; it catches up on the next broadcast.
    async fn attach(&self, tx: &mpsc::UnboundedSender<Message>) {
        match compute_snapshot(self.store.as_ref()).await {
            Ok(snapshot) => {
                let text = DataFrame::new(&snapshot).to_text();
                // Direct send; the registry does not know this connection yet.
                let _ = tx.send(Message::Text(text));
            }
            Err(e) => {
                error!(
                    connection_id = %self.connection_id,
                    error = %e,
                    "failed to compute welcome snapshot"
                );
            }
        }

        self.registry.register(self.connection_id, tx.clone());
    }
}
