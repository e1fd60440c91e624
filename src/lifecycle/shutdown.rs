//! Shutdown coordination.

use tokio::sync::broadcast;

use crate::lifecycle::signals;

/// Broadcasts a single stop notice to the HTTP server and any other
/// long-running task holding a receiver.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notify all subscribers, returning how many were still listening.
    pub fn trigger(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }

    /// Wait for SIGINT/SIGTERM, then notify subscribers.
    pub async fn trigger_on_signal(&self) {
        signals::wait_for_signal().await;
        let listeners = self.trigger();
        tracing::info!(listeners, "Shutdown signalled");
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
