//! Change notifier: the single choke point for mutation fan-out.
//!
//! Every committed mutation funnels through [`ChangeNotifier`], which
//! recomputes the full snapshot and broadcasts it to all live
//! subscribers. Failures on this path are logged and swallowed; they
//! must never alter the HTTP response that triggered the mutation.

pub mod listener;

pub use listener::ChangeListener;

use crate::snapshot::compute_snapshot;
use crate::storage::TemperatureStore;
use crate::ws::frame::DataFrame;
use crate::ws::registry::SubscriberRegistry;
use std::sync::Arc;
use tracing::{debug, error};

/// Fan-out engine connecting the storage gateway to live subscribers.
#[derive(Clone)]
pub struct ChangeNotifier {
    store: Arc<dyn TemperatureStore>,
    registry: Arc<SubscriberRegistry>,
}

impl ChangeNotifier {
    pub fn new(store: Arc<dyn TemperatureStore>, registry: Arc<SubscriberRegistry>) -> Self {
        Self { store, registry }
    }

    /// Recompute the snapshot and broadcast it to every open subscriber.
    ///
    /// Never fails to the caller: snapshot or broadcast errors are
    /// logged and the method returns.
    pub async fn notify_change(&self) {
        let snapshot = match compute_snapshot(self.store.as_ref()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "failed to compute snapshot, skipping broadcast");
                return;
            }
        };

        // Serialize once; the same frame goes to every subscriber.
        let text = DataFrame::new(&snapshot).to_text();
        let delivered = self.registry.broadcast_all(&text);
        debug!(delivered, readings = snapshot.list.len(), "change broadcast");
    }

    /// Run `notify_change` on a detached task so the caller's response
    /// never waits on broadcast completion.
    pub fn spawn_notify(&self) {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.notify_change().await;
        });
    }

    /// The subscriber registry this notifier broadcasts through.
    pub fn registry(&self) -> Arc<SubscriberRegistry> {
        Arc::clone(&self.registry)
    }
}
