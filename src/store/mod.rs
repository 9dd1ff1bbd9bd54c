//! Persistent Store Module
//!
//! The relational store behind the cache. [`ClassifierStore`] is the boundary
//! the repository talks to; [`SqliteClassifierStore`] is the production
//! backend and [`MemoryClassifierStore`] an in-process one for tests and
//! throwaway runs.

mod memory;
mod sqlite;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Classifier, NewClassifier};
use crate::pool::ObjectPool;

pub use memory::MemoryClassifierStore;
pub use sqlite::{SqliteClassifierStore, SqliteStoreOptions};

/// Storage operations needed by the cache-aside repository.
///
/// Record-producing calls fill instances taken from `pool`; on any failure
/// every instance acquired for that call is returned to the pool before the
/// error propagates.
#[async_trait]
pub trait ClassifierStore: Send + Sync {
    /// Inserts a classifier and returns its generated identifier.
    async fn insert(&self, new: &NewClassifier) -> Result<i64>;

    /// Fetches one classifier. A missing row is
    /// [`AppError::NotFound`](crate::error::AppError::NotFound), distinct
    /// from every other failure.
    async fn fetch_one(&self, id: i64, pool: &ObjectPool<Classifier>) -> Result<Classifier>;

    /// Counts all classifiers.
    async fn count(&self) -> Result<i64>;

    /// Fetches up to `limit` classifiers starting at `offset`, newest first.
    async fn fetch_page(
        &self,
        limit: i64,
        offset: i64,
        pool: &ObjectPool<Classifier>,
    ) -> Result<Vec<Classifier>>;
}

// == Connection Stats ==
/// Connection-pool counters of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionStats {
    pub open_connections: u32,
    pub in_use_connections: u32,
    pub wait_count: u64,
    pub max_idle_closed: u64,
}

/// Anything that can report [`ConnectionStats`].
pub trait ConnectionStatsSource: Send + Sync {
    fn connection_stats(&self) -> ConnectionStats;
}
