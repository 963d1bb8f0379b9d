//! Live subscriber registry.
//!
//! Tracks the set of open WebSocket connections. Broadcasts iterate a
//! stable copy of the set taken at broadcast start, so registration and
//! removal may proceed concurrently. A connection whose send fails is
//! unregistered on the spot and never blocks delivery to the rest.

use axum::extract::ws::Message;
use dashmap::DashMap;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Identity of one live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outbound queue feeding one connection's writer task. Unbounded: the
/// writer drains continuously and a closed connection is pruned on the
/// first failed send.
pub type SubscriberSender = mpsc::UnboundedSender<Message>;

/// Registry of open live connections.
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: DashMap<ConnectionId, SubscriberSender>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
        }
    }

    /// Add a connection to the open set.
    pub fn register(&self, id: ConnectionId, sender: SubscriberSender) {
        self.subscribers.insert(id, sender);
        debug!(connection_id = %id, subscribers = self.len(), "registered live subscriber");
    }

    /// Remove a connection. Idempotent; safe on an already-removed id.
    pub fn unregister(&self, id: &ConnectionId) {
        if self.subscribers.remove(id).is_some() {
            debug!(connection_id = %id, subscribers = self.len(), "unregistered live subscriber");
        }
    }

    /// Send a frame to a single connection. Failure unregisters it.
    pub fn send_to(&self, id: &ConnectionId, text: String) -> bool {
        let Some(sender) = self.subscribers.get(id).map(|s| s.clone()) else {
            return false;
        };
        if sender.send(Message::Text(text)).is_err() {
            warn!(connection_id = %id, "subscriber channel closed, removing");
            self.unregister(id);
            return false;
        }
        true
    }

    /// Deliver one frame to every currently-registered connection.
    ///
    /// Operates over a snapshot of the subscriber set taken here; a
    /// failed send removes that connection and the loop continues.
    pub fn broadcast_all(&self, text: &str) -> usize {
        let targets: Vec<(ConnectionId, SubscriberSender)> = self
            .subscribers
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut delivered = 0;
        for (id, sender) in targets {
            if sender.send(Message::Text(text.to_owned())).is_err() {
                warn!(connection_id = %id, "broadcast send failed, removing subscriber");
                self.unregister(&id);
            } else {
                delivered += 1;
            }
        }

        debug!(delivered, "broadcast complete");
        delivered
    }

    /// Number of registered connections
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// True when no connections are registered
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_unregister_idempotent() {
        let registry = SubscriberRegistry::new();
        let id = ConnectionId::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        registry.register(id, tx);
        assert_eq!(registry.len(), 1);

        registry.unregister(&id);
        registry.unregister(&id);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_open() {
        let registry = SubscriberRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        registry.register(ConnectionId::new(), tx_a);
        registry.register(ConnectionId::new(), tx_b);

        let delivered = registry.broadcast_all("{\"type\":\"data\"}");
        assert_eq!(delivered, 2);
        assert!(matches!(rx_a.recv().await, Some(Message::Text(_))));
        assert!(matches!(rx_b.recv().await, Some(Message::Text(_))));
    }

    #[tokio::test]
    async fn test_dead_subscriber_pruned_others_still_receive() {
        let registry = SubscriberRegistry::new();

        let dead_id = ConnectionId::new();
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        drop(rx_dead); // Connection already gone
        registry.register(dead_id, tx_dead);

        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        registry.register(ConnectionId::new(), tx_live);

        let delivered = registry.broadcast_all("frame");
        assert_eq!(delivered, 1);
        assert_eq!(registry.len(), 1);
        assert!(matches!(rx_live.recv().await, Some(Message::Text(_))));
    }

    #[test]
    fn test_send_to_missing_connection() {
        let registry = SubscriberRegistry::new();
        assert!(!registry.send_to(&ConnectionId::new(), "frame".into()));
    }
}
