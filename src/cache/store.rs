//! Cache Store Module
//!
//! Unsynchronized map engine behind [`TtlCache`](crate::cache::TtlCache).
//! Callers provide the locking: shared access for [`CacheStore::lookup`],
//! exclusive access for everything that mutates.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::entry::CacheEntry;

// == Lookup ==
/// Outcome of a read-only lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<V> {
    /// Entry present and fresh
    Hit(V),
    /// Entry present but past its expiry; the caller should remove it
    Expired,
    /// No entry under this key
    Missing,
}

// == Cache Store ==
/// Key-value storage with per-entry expiry.
#[derive(Debug)]
pub struct CacheStore<V> {
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    // == Set ==
    /// Stores a value, fully replacing any previous entry and its expiry.
    pub fn set(&mut self, key: String, value: V, ttl: Duration) {
        self.entries.insert(key, CacheEntry::new(value, ttl));
    }

    // == Remove Expired ==
    /// Removes `key` only if it is still expired.
    ///
    /// A writer may have replaced the entry between a reader's lookup and its
    /// call here, so expiry is re-checked under the exclusive borrow.
    pub fn remove_expired(&mut self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                true
            }
            _ => false,
        }
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Delete Prefix ==
    /// Removes every entry whose key starts with `prefix`.
    pub fn delete_prefix(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before - self.entries.len()
    }

    // == Cleanup Expired ==
    /// Removes all entries expired as of the moment this call starts.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Length ==
    /// Number of entries physically held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> CacheStore<V> {
    // == Lookup ==
    /// Reads an entry without mutating the map.
    pub fn lookup(&self, key: &str) -> Lookup<V> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => Lookup::Expired,
            Some(entry) => Lookup::Hit(entry.value.clone()),
            None => Lookup::Missing,
        }
    }
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
