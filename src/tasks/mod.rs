//! Background Tasks Module
//!
//! Long-running tasks owned by the cache and the metrics layer.
//!
//! # Tasks
//! - TTL sweep: removes expired cache entries at a fixed interval
//! - Stats sampler: snapshots store connection counters for `/debug/metrics`
//!
//! Both stop through a close-once [`Shutdown`](shutdown::Shutdown) signal.

mod cleanup;
pub mod shutdown;
pub mod stats_sampler;

use std::time::Duration;

use crate::cache::MAX_TTL;

pub(crate) use cleanup::spawn_cleanup_task;
pub use shutdown::Shutdown;
pub use stats_sampler::{StatsSampler, DEFAULT_STATS_INTERVAL};

/// Clamps a configured task period to `1ms..=MAX_TTL`.
pub(crate) fn bounded_period(interval: Duration) -> Duration {
    interval.clamp(Duration::from_millis(1), MAX_TTL)
}
