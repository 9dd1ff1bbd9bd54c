//! In-process classifier store.
//!
//! Keeps rows in a vector guarded by a lock. Counts every read it serves,
//! which makes cache hits observable, and can be switched into a failing
//! mode to exercise error paths.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::{Classifier, NewClassifier};
use crate::pool::ObjectPool;
use crate::store::{ClassifierStore, ConnectionStats, ConnectionStatsSource};

#[derive(Debug, Default)]
pub struct MemoryClassifierStore {
    rows: RwLock<Vec<Classifier>>,
    last_id: AtomicI64,
    reads: AtomicU64,
    failing: AtomicBool,
}

impl MemoryClassifierStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of read operations (`fetch_one`, `count`, `fetch_page`) served.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// While set, every operation fails with a store error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Store(sqlx::Error::Protocol(
                "memory store is unavailable".to_string(),
            )));
        }
        Ok(())
    }

    fn record_read(&self) -> Result<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()
    }
}

#[async_trait]
impl ClassifierStore for MemoryClassifierStore {
    async fn insert(&self, new: &NewClassifier) -> Result<i64> {
        self.check_available()?;

        let mut rows = self.rows.write().await;
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        rows.push(Classifier {
            id,
            name: new.name.clone(),
            description: new.description.clone(),
            is_active: new.is_active,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn fetch_one(&self, id: i64, pool: &ObjectPool<Classifier>) -> Result<Classifier> {
        let mut slot = pool.checkout();
        self.record_read()?;

        let rows = self.rows.read().await;
        let row = rows
            .iter()
            .find(|row| row.id == id)
            .ok_or(AppError::NotFound(id))?;
        slot.clone_from(row);
        Ok(slot.into_inner())
    }

    async fn count(&self) -> Result<i64> {
        self.record_read()?;
        let rows = self.rows.read().await;
        Ok(i64::try_from(rows.len()).unwrap_or(i64::MAX))
    }

    async fn fetch_page(
        &self,
        limit: i64,
        offset: i64,
        pool: &ObjectPool<Classifier>,
    ) -> Result<Vec<Classifier>> {
        self.record_read()?;

        let limit = usize::try_from(limit).unwrap_or(0);
        let offset = usize::try_from(offset).unwrap_or(0);
        let mut batch = pool.batch(limit);

        // ids grow with insertion, so reverse order is newest first
        let rows = self.rows.read().await;
        for row in rows.iter().rev().skip(offset).take(limit) {
            batch.next_slot().clone_from(row);
        }
        Ok(batch.into_inner())
    }
}

impl ConnectionStatsSource for MemoryClassifierStore {
    fn connection_stats(&self) -> ConnectionStats {
        ConnectionStats::default()
    }
}
