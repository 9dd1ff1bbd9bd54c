//! Single-fire shutdown signal shared by background tasks.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

/// Close-once shutdown signal.
///
/// `trigger` flips an atomic flag exactly once and publishes the change on a
/// watch channel; every later call is a no-op. Dropping the signal also
/// releases any waiting task.
#[derive(Debug)]
pub struct Shutdown {
    fired: AtomicBool,
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            fired: AtomicBool::new(false),
            tx,
        }
    }

    /// Returns a receiver for a background task to wait on.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Fires the signal. Returns `true` only for the call that actually fired it.
    pub fn trigger(&self) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.tx.send_replace(true);
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once shutdown has been triggered or the signal was dropped.
pub async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}
