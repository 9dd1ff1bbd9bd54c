//! Connection Stats Sampler
//!
//! Background task that copies a store's connection-pool counters into
//! atomics, so the metrics endpoint reads a recent snapshot without touching
//! the store.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::store::{ConnectionStats, ConnectionStatsSource};
use crate::tasks::bounded_period;
use crate::tasks::shutdown::{wait_for_shutdown, Shutdown};

/// Default period between samples.
pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Default)]
struct SampledStats {
    open_connections: AtomicU32,
    in_use_connections: AtomicU32,
    wait_count: AtomicU64,
    max_idle_closed: AtomicU64,
}

impl SampledStats {
    fn record(&self, stats: ConnectionStats) {
        self.open_connections
            .store(stats.open_connections, Ordering::Relaxed);
        self.in_use_connections
            .store(stats.in_use_connections, Ordering::Relaxed);
        self.wait_count.store(stats.wait_count, Ordering::Relaxed);
        self.max_idle_closed
            .store(stats.max_idle_closed, Ordering::Relaxed);
    }

    fn load(&self) -> ConnectionStats {
        ConnectionStats {
            open_connections: self.open_connections.load(Ordering::Relaxed),
            in_use_connections: self.in_use_connections.load(Ordering::Relaxed),
            wait_count: self.wait_count.load(Ordering::Relaxed),
            max_idle_closed: self.max_idle_closed.load(Ordering::Relaxed),
        }
    }
}

// == Stats Sampler ==
/// Periodic sampler of [`ConnectionStats`].
///
/// Takes one sample immediately, then one per interval until closed.
pub struct StatsSampler {
    stats: Arc<SampledStats>,
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

impl StatsSampler {
    /// Starts sampling `source` every `interval`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(source: Arc<dyn ConnectionStatsSource>, interval: Duration) -> Self {
        let stats = Arc::new(SampledStats::default());
        let shutdown = Shutdown::new();
        let period = bounded_period(interval);

        let sampled = stats.clone();
        let mut rx = shutdown.subscribe();
        let handle = tokio::spawn(async move {
            info!("Starting stats sampler with interval of {:?}", period);

            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let snapshot = source.connection_stats();
                        sampled.record(snapshot);
                        debug!(?snapshot, "Sampled connection stats");
                    }
                    _ = wait_for_shutdown(&mut rx) => break,
                }
            }

            info!("Stats sampler stopped");
        });

        Self {
            stats,
            shutdown,
            handle,
        }
    }

    /// Most recent sample; all zeros before the first one lands.
    pub fn snapshot(&self) -> ConnectionStats {
        self.stats.load()
    }

    /// Stops sampling. Safe to call any number of times.
    pub fn close(&self) {
        if self.shutdown.trigger() {
            info!("Stats sampler closing");
        }
    }

    pub fn is_sampling(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl std::fmt::Debug for StatsSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsSampler")
            .field("last", &self.snapshot())
            .field("closed", &self.shutdown.is_triggered())
            .finish()
    }
}
