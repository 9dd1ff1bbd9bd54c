//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::repository::RepositoryConfig;
use crate::store::SqliteStoreOptions;

/// `DB_DSN` value that selects the in-process store.
pub const MEMORY_DSN: &str = "memory";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub server_addr: String,
    /// sqlx SQLite URL, or `memory`
    pub db_dsn: String,
    /// Maximum open store connections
    pub db_max_open_conns: u32,
    /// Idle connection timeout
    pub db_max_idle_time: Duration,
    /// Cache sweep interval in seconds
    pub cache_sweep_interval: u64,
    /// Connection stats sampling interval in seconds
    pub stats_interval: u64,
    /// Maximum idle records kept by the object pool
    pub object_pool_capacity: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_ADDR` - Bind address (default: 0.0.0.0:4000)
    /// - `DB_DSN` - Store URL or `memory` (default: sqlite://classifiers.db)
    /// - `DB_MAX_OPEN_CONNS` - Pool size (default: 25)
    /// - `DB_MAX_IDLE_TIME` - Idle timeout such as `15m`, `1h30m` or bare seconds (default: 15m)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 300)
    /// - `STATS_INTERVAL` - Sampling frequency in seconds (default: 10)
    /// - `OBJECT_POOL_CAPACITY` - Idle pooled records (default: 256)
    ///
    /// A variable that is set but unparseable is logged and replaced by its
    /// default. `DB_MAX_IDLE_CONNS` is not supported: the sqlx pool has no
    /// idle-connection cap, only `DB_MAX_OPEN_CONNS` and the idle timeout.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        if env::var_os("DB_MAX_IDLE_CONNS").is_some() {
            warn!("DB_MAX_IDLE_CONNS is not supported and is ignored");
        }
        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or(defaults.server_addr),
            db_dsn: env::var("DB_DSN").unwrap_or(defaults.db_dsn),
            db_max_open_conns: env_or("DB_MAX_OPEN_CONNS", defaults.db_max_open_conns),
            db_max_idle_time: env_duration_or("DB_MAX_IDLE_TIME", defaults.db_max_idle_time),
            cache_sweep_interval: env_or("CACHE_SWEEP_INTERVAL", defaults.cache_sweep_interval),
            stats_interval: env_or("STATS_INTERVAL", defaults.stats_interval),
            object_pool_capacity: env_or("OBJECT_POOL_CAPACITY", defaults.object_pool_capacity),
        }
    }

    pub fn uses_memory_store(&self) -> bool {
        self.db_dsn == MEMORY_DSN
    }

    pub fn store_options(&self) -> SqliteStoreOptions {
        SqliteStoreOptions {
            url: self.db_dsn.clone(),
            max_connections: self.db_max_open_conns,
            idle_timeout: self.db_max_idle_time,
        }
    }

    pub fn repository_config(&self) -> RepositoryConfig {
        RepositoryConfig {
            sweep_interval: Duration::from_secs(self.cache_sweep_interval),
            pool_capacity: self.object_pool_capacity,
        }
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0:4000".to_string(),
            db_dsn: "sqlite://classifiers.db".to_string(),
            db_max_open_conns: 25,
            db_max_idle_time: Duration::from_secs(15 * 60),
            cache_sweep_interval: 300,
            stats_interval: 10,
            object_pool_capacity: 256,
        }
    }
}

/// Reads and parses `key`, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    let Ok(raw) = env::var(key) else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(key, value = %raw, "Invalid value, using default");
        default
    })
}

/// Like [`env_or`] but for durations in [`parse_duration`] format.
fn env_duration_or(key: &str, default: Duration) -> Duration {
    let Ok(raw) = env::var(key) else {
        return default;
    };
    parse_duration(&raw).unwrap_or_else(|| {
        warn!(key, value = %raw, "Invalid duration, using default");
        default
    })
}

/// Parses a duration such as `90`, `15m`, `1h30m` or `250ms`.
///
/// A bare integer is seconds. Otherwise the value is a run of integer and
/// unit pairs, with units `h`, `m`, `s` and `ms`.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    if raw.is_empty() {
        return None;
    }

    let mut total = Duration::ZERO;
    let mut rest = raw;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let amount: u32 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = match &rest[..unit_len] {
            "h" => Duration::from_secs(60 * 60),
            "m" => Duration::from_secs(60),
            "s" => Duration::from_secs(1),
            "ms" => Duration::from_millis(1),
            _ => return None,
        };
        rest = &rest[unit_len..];

        total = total.checked_add(unit.checked_mul(amount)?)?;
    }
    Some(total)
}
