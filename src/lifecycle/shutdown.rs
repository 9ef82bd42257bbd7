//! Shutdown coordination for the relay.
//!
//! A [`Shutdown`] is the only source of the stop signal. OS signals are
//! forwarded into it by [`Shutdown::watch_signals`]; tests call
//! [`Shutdown::trigger`] directly. Dropping the coordinator also stops
//! every subscriber.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::lifecycle::signals;

/// Coordinator for graceful shutdown.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A signal that resolves once shutdown is triggered.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Stop every subscribed server.
    pub fn trigger(&self) {
        if self.tx.send(()).is_ok() {
            tracing::info!("Shutdown requested");
        }
    }

    /// Forward SIGINT/SIGTERM into this coordinator.
    pub fn watch_signals(&self) -> JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            signals::wait_for_signal().await;
            let _ = tx.send(());
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half handed to a server.
pub struct ShutdownSignal {
    rx: broadcast::Receiver<()>,
}

impl ShutdownSignal {
    /// Wait for a trigger, or for the coordinator to be dropped.
    pub async fn recv(mut self) {
        let _ = self.rx.recv().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_trigger_reaches_every_subscriber() {
        let shutdown = Shutdown::new();
        let a = tokio::spawn(shutdown.subscribe().recv());
        let b = tokio::spawn(shutdown.subscribe().recv());

        shutdown.trigger();
        assert!(timeout(Duration::from_secs(1), a).await.is_ok());
        assert!(timeout(Duration::from_secs(1), b).await.is_ok());
    }

    #[tokio::test]
    async fn test_signal_pending_until_triggered() {
        let shutdown = Shutdown::new();
        let signal = shutdown.subscribe();
        assert!(timeout(Duration::from_millis(50), signal.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_dropping_coordinator_releases_signal() {
        let shutdown = Shutdown::new();
        let signal = shutdown.subscribe();
        drop(shutdown);
        assert!(timeout(Duration::from_secs(1), signal.recv()).await.is_ok());
    }
}
