//! Cache Module
//!
//! In-process TTL cache with lazy expiry on read and a periodic background
//! sweep. Eviction is time-based only; there is no size bound.

mod entry;
mod key;
mod stats;
mod store;
mod ttl;


// Re-export public types
pub(crate) use entry::deadline_after;
pub use entry::MAX_TTL;
pub use key::{make_cache_key, KEY_SEPARATOR};
pub use stats::CacheStats;
pub(crate) use stats::StatsCounters;
pub use store::{CacheStore, Lookup};
pub use ttl::{TtlCache, DEFAULT_SWEEP_INTERVAL};
