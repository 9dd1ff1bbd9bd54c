//! Concurrent TTL cache with a background sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::stats::StatsCounters;
use crate::cache::store::{CacheStore, Lookup};
use crate::cache::CacheStats;
use crate::tasks::shutdown::Shutdown;
use crate::tasks::spawn_cleanup_task;

/// Default period between background sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

// == TTL Cache ==
/// Thread-safe key/value cache with per-entry expiry.
///
/// Readers share a read lock; writers and the sweep take the write lock. An
/// expired entry is invisible from the moment it expires: `get` removes it
/// lazily, and the background sweep reclaims whatever nobody reads.
///
/// Operations never fail. After [`close`](TtlCache::close) the cache keeps
/// working as a plain map without background reclamation.
pub struct TtlCache<V> {
    store: Arc<RwLock<CacheStore<V>>>,
    counters: Arc<StatsCounters>,
    shutdown: Shutdown,
    sweeper: JoinHandle<()>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty cache and starts its sweep task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(sweep_interval: Duration) -> Self {
        let store = Arc::new(RwLock::new(CacheStore::new()));
        let counters = Arc::new(StatsCounters::default());
        let shutdown = Shutdown::new();
        let sweeper = spawn_cleanup_task(
            store.clone(),
            counters.clone(),
            sweep_interval,
            shutdown.subscribe(),
        );

        Self {
            store,
            counters,
            shutdown,
            sweeper,
        }
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let mut store = self.store.write().await;
        store.set(key.into(), value, ttl);
    }

    // == Get ==
    /// Returns the value if present and not expired.
    ///
    /// An expired entry is removed on the way out. The removal re-checks
    /// expiry under the write lock, so a concurrent `set` that refreshed the
    /// key is never lost.
    pub async fn get(&self, key: &str) -> Option<V> {
        let lookup = self.store.read().await.lookup(key);

        match lookup {
            Lookup::Hit(value) => {
                self.counters.record_hit();
                Some(value)
            }
            Lookup::Missing => {
                self.counters.record_miss();
                None
            }
            Lookup::Expired => {
                if self.store.write().await.remove_expired(key) {
                    self.counters.record_lazy_expiration();
                    debug!(key, "Removed expired cache entry on read");
                }
                self.counters.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes `key` if present.
    pub async fn delete(&self, key: &str) {
        let removed = self.store.write().await.delete(key);
        if removed {
            debug!(key, "Cache entry invalidated");
        }
    }

    // == Delete Prefix ==
    /// Removes every key starting with `prefix` in one critical section.
    pub async fn delete_prefix(&self, prefix: &str) -> usize {
        self.store.write().await.delete_prefix(prefix)
    }

    // == Close ==
    /// Stops the sweep task. Safe to call any number of times.
    pub fn close(&self) {
        if self.shutdown.trigger() {
            info!("TTL cache closed, sweep stopping");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Whether the background sweep task is still alive.
    pub fn is_sweeping(&self) -> bool {
        !self.sweeper.is_finished()
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        let len = self.store.read().await.len();
        self.counters.snapshot(len)
    }

    /// Number of entries physically held, including expired ones not yet
    /// reclaimed.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("closed", &self.shutdown.is_triggered())
            .finish_non_exhaustive()
    }
}
