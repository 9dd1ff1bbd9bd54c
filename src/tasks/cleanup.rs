//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::{deadline_after, CacheStore, StatsCounters};
use crate::tasks::bounded_period;
use crate::tasks::shutdown::wait_for_shutdown;

/// Spawns the sweep loop for one cache.
///
/// The first sweep happens one full `interval` after spawning. Each sweep
/// takes the write lock and removes every entry expired as of the scan's
/// start. The loop exits as soon as `shutdown` fires or its sender is
/// dropped; it never runs again afterwards.
///
/// Must be called from within a Tokio runtime.
pub(crate) fn spawn_cleanup_task<V>(
    cache: Arc<RwLock<CacheStore<V>>>,
    counters: Arc<StatsCounters>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    // interval_at panics on a zero period or an overflowing start
    let period = bounded_period(interval);

    tokio::spawn(async move {
        info!("Starting TTL sweep task with interval of {:?}", period);

        let start = deadline_after(Instant::now(), period);
        let mut ticker = tokio::time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = {
                        let mut cache_guard = cache.write().await;
                        cache_guard.cleanup_expired()
                    };
                    counters.record_swept(removed);

                    if removed > 0 {
                        info!("TTL sweep: removed {} expired entries", removed);
                    } else {
                        debug!("TTL sweep: no expired entries found");
                    }
                }
                _ = wait_for_shutdown(&mut shutdown) => break,
            }
        }

        info!("TTL sweep task stopped");
    })
}
