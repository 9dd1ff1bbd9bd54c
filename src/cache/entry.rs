//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use tokio::time::{Duration, Instant};

/// Longest lifetime an entry can get; larger TTLs are capped to it.
pub const MAX_TTL: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

/// Deadline `ttl` after `now`, capped at [`MAX_TTL`] so it never overflows.
pub(crate) fn deadline_after(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl.min(MAX_TTL)).unwrap_or(now)
}

// == Cache Entry ==
/// A single stored value together with its expiry instant.
///
/// Entries are never mutated in place: a `set` on an existing key replaces
/// the whole entry.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Instant at which the entry stops being visible to readers
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` from now. Any `ttl` is accepted.
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: deadline_after(Instant::now(), ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks expiry against a fixed instant, so a sweep can judge every
    /// entry as of the moment the scan started.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
