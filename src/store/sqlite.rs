//! SQLite-backed classifier store using sqlx.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use futures::TryStreamExt;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::Row;
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::{Classifier, NewClassifier};
use crate::pool::ObjectPool;
use crate::repository::MAX_PAGE_SIZE;
use crate::store::{ClassifierStore, ConnectionStats, ConnectionStatsSource};

const INSERT_CLASSIFIER: &str =
    "INSERT INTO classifiers (name, description, is_active, created_at) VALUES (?, ?, ?, ?)";

const SELECT_BY_ID: &str =
    "SELECT id, name, description, is_active, created_at FROM classifiers WHERE id = ?";

const COUNT_CLASSIFIERS: &str = "SELECT COUNT(*) FROM classifiers";

const SELECT_PAGE: &str = "SELECT id, name, description, is_active, created_at \
     FROM classifiers \
     ORDER BY created_at DESC, id DESC \
     LIMIT ? OFFSET ?";

/// Connection settings for [`SqliteClassifierStore`].
#[derive(Debug, Clone)]
pub struct SqliteStoreOptions {
    /// sqlx SQLite URL, e.g. `sqlite://classifiers.db`
    pub url: String,
    pub max_connections: u32,
    pub idle_timeout: Duration,
}

impl Default for SqliteStoreOptions {
    fn default() -> Self {
        Self {
            url: "sqlite://classifiers.db".to_string(),
            max_connections: 25,
            idle_timeout: Duration::from_secs(15 * 60),
        }
    }
}

/// Classifier store over a pooled SQLite database.
///
/// sqlx keeps a per-connection prepared-statement cache, so the fixed queries
/// above are prepared once per connection and released when the pool closes.
#[derive(Debug, Clone)]
pub struct SqliteClassifierStore {
    pool: SqlitePool,
}

impl SqliteClassifierStore {
    /// Opens (creating if needed) the database with WAL enabled.
    ///
    /// `sqlite::memory:` URLs give every pooled connection its own database;
    /// use a file for anything that needs more than one connection.
    pub async fn connect(options: &SqliteStoreOptions) -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(&options.url)?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections.max(1))
            .idle_timeout(options.idle_timeout)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(connect_options)
            .await?;

        info!(
            url = %options.url,
            max_connections = options.max_connections,
            "Connected to SQLite store"
        );
        Ok(Self { pool })
    }

    /// Applies pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes every pooled connection. Call after the repository is closed.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Copies one row into a pooled record, reusing its name buffer.
fn fill_classifier(row: &SqliteRow, classifier: &mut Classifier) -> Result<()> {
    classifier.id = row.try_get("id")?;
    classifier.name.clear();
    classifier.name.push_str(row.try_get::<&str, _>("name")?);
    classifier.description = row.try_get("description")?;
    classifier.is_active = row.try_get("is_active")?;
    classifier.created_at = row.try_get("created_at")?;
    Ok(())
}

#[async_trait]
impl ClassifierStore for SqliteClassifierStore {
    async fn insert(&self, new: &NewClassifier) -> Result<i64> {
        // fixed-width timestamps keep text ordering equal to time ordering
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let result = sqlx::query(INSERT_CLASSIFIER)
            .bind(&new.name)
            .bind(new.description.as_deref())
            .bind(new.is_active)
            .bind(created_at)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn fetch_one(&self, id: i64, pool: &ObjectPool<Classifier>) -> Result<Classifier> {
        let mut slot = pool.checkout();

        let row = sqlx::query(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound(id))?;

        fill_classifier(&row, &mut slot)?;
        Ok(slot.into_inner())
    }

    async fn count(&self) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(COUNT_CLASSIFIERS)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn fetch_page(
        &self,
        limit: i64,
        offset: i64,
        pool: &ObjectPool<Classifier>,
    ) -> Result<Vec<Classifier>> {
        let capacity = usize::try_from(limit.clamp(0, MAX_PAGE_SIZE)).unwrap_or(0);
        let mut batch = pool.batch(capacity);

        let mut rows = sqlx::query(SELECT_PAGE)
            .bind(limit)
            .bind(offset)
            .fetch(&self.pool);

        while let Some(row) = rows.try_next().await? {
            fill_classifier(&row, batch.next_slot())?;
        }

        Ok(batch.into_inner())
    }
}

impl ConnectionStatsSource for SqliteClassifierStore {
    fn connection_stats(&self) -> ConnectionStats {
        let open = self.pool.size();
        let idle = u32::try_from(self.pool.num_idle()).unwrap_or(u32::MAX);

        // sqlx does not expose wait or idle-close counters
        ConnectionStats {
            open_connections: open,
            in_use_connections: open.saturating_sub(idle),
            wait_count: 0,
            max_idle_closed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (SqliteClassifierStore, TempDir) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let options = SqliteStoreOptions {
            url: format!("sqlite://{}", dir.path().join("test.db").display()),
            max_connections: 4,
            ..SqliteStoreOptions::default()
        };
        let store = SqliteClassifierStore::connect(&options)
            .await
            .expect("failed to connect");
        store.migrate().await.expect("failed to run migrations");
        (store, dir)
    }

    #[tokio::test]
    async fn test_migration_creates_table() {
        let (store, _dir) = test_store().await;

        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='classifiers'",
        )
        .fetch_one(store.pool())
        .await
        .expect("failed to query table");

        assert_eq!(result.0, 1, "classifiers table should exist");
        store.close().await;
    }

    #[tokio::test]
    async fn test_insert_and_fetch_preserves_optionals() {
        let (store, _dir) = test_store().await;
        let pool = ObjectPool::new(8);

        let bare = store.insert(&NewClassifier::new("bare")).await.unwrap();
        let empty = store
            .insert(&NewClassifier::new("empty").with_description("").with_active(false))
            .await
            .unwrap();

        let bare = store.fetch_one(bare, &pool).await.unwrap();
        assert_eq!(bare.name, "bare");
        assert_eq!(bare.description, None);
        assert_eq!(bare.is_active, None);

        let empty = store.fetch_one(empty, &pool).await.unwrap();
        assert_eq!(empty.description.as_deref(), Some(""));
        assert_eq!(empty.is_active, Some(false));

        store.close().await;
    }

    #[tokio::test]
    async fn test_fetch_missing_is_not_found_and_returns_slot() {
        let (store, _dir) = test_store().await;
        let pool = ObjectPool::new(8);

        let result = store.fetch_one(999, &pool).await;

        assert!(matches!(result, Err(AppError::NotFound(999))));
        assert_eq!(pool.idle_count(), 1);
        store.close().await;
    }

    #[tokio::test]
    async fn test_fetch_page_newest_first() {
        let (store, _dir) = test_store().await;
        let pool = ObjectPool::new(8);

        for name in ["A", "B", "C"] {
            store.insert(&NewClassifier::new(name)).await.unwrap();
        }

        assert_eq!(store.count().await.unwrap(), 3);

        let first: Vec<String> = store
            .fetch_page(2, 0, &pool)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(first, vec!["C", "B"]);

        let second = store.fetch_page(2, 2, &pool).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "A");

        store.close().await;
    }

    #[tokio::test]
    async fn test_fetch_page_decode_failure_releases_batch() {
        let (store, _dir) = test_store().await;
        let pool = ObjectPool::new(8);

        store.insert(&NewClassifier::new("good-1")).await.unwrap();
        store.insert(&NewClassifier::new("good-2")).await.unwrap();
        // sorts after every real timestamp and cannot be decoded
        sqlx::query("INSERT INTO classifiers (name, created_at) VALUES ('broken', '0000-bad')")
            .execute(store.pool())
            .await
            .unwrap();

        let result = store.fetch_page(20, 0, &pool).await;

        assert!(matches!(result, Err(AppError::Store(_))));
        assert_eq!(pool.idle_count(), 3, "every acquired record goes back");
        store.close().await;
    }

    #[tokio::test]
    async fn test_connection_stats() {
        let (store, _dir) = test_store().await;

        let stats = store.connection_stats();
        assert!(stats.open_connections >= 1);
        assert!(stats.in_use_connections <= stats.open_connections);

        store.close().await;
    }
}
