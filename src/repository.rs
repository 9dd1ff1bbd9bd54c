//! Cache-Aside Classifier Repository
//!
//! Reads go through the TTL cache first and fall back to the store on a miss,
//! populating the cache with the fresh value. Inserts go to the store and then
//! invalidate every cached listing page. Point lookups for other ids are left
//! alone since an insert cannot change them.
//!
//! Missing records are never cached; every `get` of an unknown id reaches the
//! store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::{make_cache_key, CacheStats, TtlCache, DEFAULT_SWEEP_INTERVAL};
use crate::error::{AppError, Result};
use crate::models::{Classifier, ClassifierPage, NewClassifier};
use crate::pool::{ObjectPool, DEFAULT_POOL_CAPACITY};
use crate::store::ClassifierStore;

/// TTL for a single-record lookup.
pub const RECORD_TTL: Duration = Duration::from_secs(5 * 60);

/// TTL for a listing page; shorter because every insert affects it.
pub const LIST_TTL: Duration = Duration::from_secs(60);

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

const RECORD_KEY_PREFIX: &str = "classifier";
const LIST_KEY_PREFIX: &str = "classifiers:list";

// == Cached Value ==
/// Shapes stored in the repository's cache.
#[derive(Debug, Clone)]
pub enum Cached {
    Record(Arc<Classifier>),
    Page(Arc<ClassifierPage>),
}

// == Pagination ==
/// Page request normalised onto the canonical range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Pagination {
    /// Clamps raw parameters: `page < 1` becomes 1 and a `page_size` outside
    /// `1..=100` becomes 20. Out-of-range requests therefore share the cache
    /// key of the default page instead of each bypassing the cache.
    pub fn clamped(page: i64, page_size: i64) -> Self {
        let page = page.max(1);
        let page_size = if (1..=MAX_PAGE_SIZE).contains(&page_size) {
            page_size
        } else {
            DEFAULT_PAGE_SIZE
        };
        Self { page, page_size }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn cache_key(&self) -> String {
        make_cache_key([
            LIST_KEY_PREFIX.to_string(),
            self.page.to_string(),
            self.page_size.to_string(),
        ])
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn record_key(id: i64) -> String {
    make_cache_key([RECORD_KEY_PREFIX.to_string(), id.to_string()])
}

// == Repository Config ==
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Period of the cache's background sweep
    pub sweep_interval: Duration,
    /// Maximum idle records kept by the object pool
    pub pool_capacity: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

// == Classifier Repository ==
/// Cache-aside façade over a [`ClassifierStore`].
pub struct ClassifierRepository {
    store: Arc<dyn ClassifierStore>,
    cache: TtlCache<Cached>,
    pool: ObjectPool<Classifier>,
    /// Bumped by every insert; a listing read that overlapped an insert does
    /// not leave its result in the cache.
    list_generation: AtomicU64,
}

impl ClassifierRepository {
    /// Creates the repository and starts its cache sweep.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(store: Arc<dyn ClassifierStore>, config: RepositoryConfig) -> Self {
        Self {
            store,
            cache: TtlCache::new(config.sweep_interval),
            pool: ObjectPool::new(config.pool_capacity),
            list_generation: AtomicU64::new(0),
        }
    }

    // == Insert ==
    /// Validates and stores a classifier, then invalidates cached listings.
    ///
    /// The new record itself is not cached; the next `get` loads it.
    pub async fn insert(&self, new: NewClassifier) -> Result<i64> {
        new.validate()?;

        let id = self.store.insert(&new).await?;

        self.list_generation.fetch_add(1, Ordering::AcqRel);
        let invalidated = self.cache.delete_prefix(LIST_KEY_PREFIX).await;
        info!(id, invalidated, "Classifier inserted, listing cache invalidated");

        Ok(id)
    }

    // == Get ==
    /// Returns one classifier, from cache when possible.
    pub async fn get(&self, id: i64) -> Result<Arc<Classifier>> {
        if id < 1 {
            return Err(AppError::validation("invalid id parameter"));
        }

        let key = record_key(id);
        if let Some(Cached::Record(record)) = self.cache.get(&key).await {
            debug!(id, "Classifier served from cache");
            return Ok(record);
        }

        debug!(id, "Classifier cache miss");
        let record = Arc::new(self.store.fetch_one(id, &self.pool).await?);
        self.cache
            .set(key, Cached::Record(record.clone()), RECORD_TTL)
            .await;

        Ok(record)
    }

    // == List ==
    /// Returns one page of classifiers, newest first, with the total count.
    ///
    /// Parameters are clamped (see [`Pagination::clamped`]) before the cache
    /// key is built. Records and total are cached together.
    pub async fn list(&self, page: i64, page_size: i64) -> Result<Arc<ClassifierPage>> {
        let pagination = Pagination::clamped(page, page_size);
        let key = pagination.cache_key();

        if let Some(Cached::Page(cached)) = self.cache.get(&key).await {
            debug!(key = %key, "Listing served from cache");
            return Ok(cached);
        }

        debug!(key = %key, "Listing cache miss");
        let generation = self.list_generation.load(Ordering::Acquire);

        let total = self.store.count().await?;
        let classifiers = self
            .store
            .fetch_page(pagination.page_size, pagination.offset(), &self.pool)
            .await?;
        let page = Arc::new(ClassifierPage { classifiers, total });

        self.cache
            .set(key.clone(), Cached::Page(page.clone()), LIST_TTL)
            .await;

        // an insert's bump precedes its invalidation, so either it sees the
        // entry written above or this check sees the bump
        if self.list_generation.load(Ordering::Acquire) != generation {
            self.cache.delete(&key).await;
            debug!(key = %key, "Insert raced with listing read, entry dropped");
        }

        Ok(page)
    }

    // == Close ==
    /// Stops the cache's background sweep. Idempotent.
    ///
    /// The store itself stays open; its owner closes it afterwards.
    pub fn close(&self) -> Result<()> {
        self.cache.close();
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.cache.is_closed()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// The repository's cache, for diagnostics.
    pub fn cache(&self) -> &TtlCache<Cached> {
        &self.cache
    }

    /// The record pool, for diagnostics.
    pub fn object_pool(&self) -> &ObjectPool<Classifier> {
        &self.pool
    }
}
