// Periodic liveness announcements, independent of leadership role

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::info;

/// Announces liveness on a fixed interval until stopped.
pub struct Heartbeater {
    node_id: String,
    interval: Duration,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Heartbeater {
    pub fn new(node_id: impl Into<String>, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            node_id: node_id.into(),
            interval,
            shutdown_tx,
            shutdown_rx,
            handle: Mutex::new(None),
        }
    }

    /// Spawn the heartbeat loop.
    pub fn start(&self) {
        let node_id = self.node_id.clone();
        let interval = self.interval;
        let mut shutdown_rx = self.shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        info!(node_id = %node_id, "heartbeat stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        info!(node_id = %node_id, "heartbeat: node alive");
                    }
                }
            }
        });
        *self.handle.lock().unwrap() = Some(handle);
    }

    /// Signal the loop to exit and wait for it. Safe to call more than once.
    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        let handle = self.handle.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}
