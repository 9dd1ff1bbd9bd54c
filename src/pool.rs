//! Object Pool for Allocation Reuse
//!
//! Recycles instances of one hot type on the read path. The pool is advisory:
//! it never blocks and never errors. If the idle list is contended, `acquire`
//! simply allocates and `release` simply drops, so correctness never depends
//! on reuse actually happening.
//!
//! Only instances that are dropped unclaimed come back: a lookup that ends in
//! not-found, a row that fails to decode, or the rest of a batch abandoned
//! mid-fill. A record handed out through `into_inner` belongs to the caller
//! (and usually ends up shared in the cache), so it never returns. Reuse is
//! therefore a failure-path saving, not a per-request one.

use std::ops::{Deref, DerefMut};

use tokio::sync::Mutex;

/// Types that can be recycled through an [`ObjectPool`].
pub trait Poolable: Default {
    /// Returns identifying fields to their neutral state. Implementations may
    /// keep allocations (e.g. string capacity) for the next `acquire`.
    fn reset(&mut self);
}

/// Default number of idle instances kept around.
pub const DEFAULT_POOL_CAPACITY: usize = 256;

/// Idle-instance pool for one type.
#[derive(Debug)]
pub struct ObjectPool<T> {
    idle: Mutex<Vec<T>>,
    max_idle: usize,
}

impl<T: Poolable> ObjectPool<T> {
    /// Creates a pool that keeps at most `max_idle` released instances.
    pub fn new(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(max_idle.min(DEFAULT_POOL_CAPACITY))),
            max_idle,
        }
    }

    /// Takes a recycled instance, or builds a new one if none is free.
    pub fn acquire(&self) -> T {
        self.idle
            .try_lock()
            .ok()
            .and_then(|mut idle| idle.pop())
            .unwrap_or_default()
    }

    /// Resets `item` and keeps it for reuse when there is room.
    pub fn release(&self, mut item: T) {
        item.reset();
        // If we couldn't get the lock, just drop the instance
        if let Ok(mut idle) = self.idle.try_lock() {
            if idle.len() < self.max_idle {
                idle.push(item);
            }
        }
    }

    /// Releases every instance in `items`.
    pub fn release_all(&self, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.release(item);
        }
    }

    /// Checks out one instance that goes back to the pool on drop unless
    /// [`Pooled::into_inner`] is called.
    pub fn checkout(&self) -> Pooled<'_, T> {
        Pooled {
            item: self.acquire(),
            kept: false,
            pool: self,
        }
    }

    /// Starts a batch whose members all go back to the pool on drop unless
    /// [`PooledBatch::into_inner`] is called.
    pub fn batch(&self, capacity: usize) -> PooledBatch<'_, T> {
        PooledBatch {
            items: Vec::with_capacity(capacity),
            pool: self,
        }
    }

    /// Current number of idle instances (for monitoring)
    pub fn idle_count(&self) -> usize {
        self.idle.try_lock().map(|idle| idle.len()).unwrap_or(0)
    }
}

impl<T: Poolable> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

// == Single Checkout ==
/// One pooled instance, returned to its pool when dropped.
pub struct Pooled<'a, T: Poolable> {
    item: T,
    kept: bool,
    pool: &'a ObjectPool<T>,
}

impl<T: Poolable> Pooled<'_, T> {
    /// Keeps the instance; it will not return to the pool.
    pub fn into_inner(mut self) -> T {
        self.kept = true;
        std::mem::take(&mut self.item)
    }
}

impl<T: Poolable> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T: Poolable> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.item
    }
}

impl<T: Poolable> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if !self.kept {
            self.pool.release(std::mem::take(&mut self.item));
        }
    }
}

// == Batch Checkout ==
/// A growing batch of pooled instances.
///
/// Filling a batch is the error-prone part (row decoding); any early return
/// drops the batch and every instance acquired so far goes back to the pool.
pub struct PooledBatch<'a, T: Poolable> {
    items: Vec<T>,
    pool: &'a ObjectPool<T>,
}

impl<T: Poolable> PooledBatch<'_, T> {
    /// Acquires one more instance into the batch and hands it out for filling.
    pub fn next_slot(&mut self) -> &mut T {
        self.items.push(self.pool.acquire());
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Keeps every instance; none return to the pool.
    pub fn into_inner(mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }
}

impl<T: Poolable> Drop for PooledBatch<'_, T> {
    fn drop(&mut self) {
        let items = std::mem::take(&mut self.items);
        self.pool.release_all(items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Slot {
        id: i64,
        label: String,
    }

    impl Poolable for Slot {
        fn reset(&mut self) {
            self.id = 0;
            self.label.clear();
        }
    }

    #[test]
    fn test_acquire_from_empty_pool_allocates() {
        let pool: ObjectPool<Slot> = ObjectPool::new(4);
        assert_eq!(pool.acquire(), Slot::default());
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_release_resets_and_recycles() {
        let pool = ObjectPool::new(4);
        let mut slot: Slot = pool.acquire();
        slot.id = 9;
        slot.label.push_str("reused");
        let capacity = slot.label.capacity();

        pool.release(slot);
        assert_eq!(pool.idle_count(), 1);

        let recycled = pool.acquire();
        assert_eq!(recycled.id, 0);
        assert!(recycled.label.is_empty());
        assert_eq!(recycled.label.capacity(), capacity, "allocation is kept");
    }

    #[test]
    fn test_release_beyond_capacity_drops() {
        let pool: ObjectPool<Slot> = ObjectPool::new(2);
        pool.release_all(vec![Slot::default(), Slot::default(), Slot::default()]);
        assert_eq!(pool.idle_count(), 2);
    }

    #[tokio::test]
    async fn test_contended_pool_never_blocks() {
        let pool: ObjectPool<Slot> = ObjectPool::new(4);
        pool.release(Slot::default());

        let _held = pool.idle.lock().await;
        // acquire falls back to allocation, release drops
        assert_eq!(pool.acquire(), Slot::default());
        pool.release(Slot::default());
    }

    #[test]
    fn test_checkout_returns_on_drop() {
        let pool: ObjectPool<Slot> = ObjectPool::new(4);
        {
            let mut slot = pool.checkout();
            slot.id = 5;
        }
        assert_eq!(pool.idle_count(), 1);

        let kept = pool.checkout();
        let kept = kept.into_inner();
        assert_eq!(kept.id, 0);
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_failed_batch_releases_everything() {
        let pool: ObjectPool<Slot> = ObjectPool::new(16);

        let fill = |fail_at: usize| -> Result<Vec<Slot>, String> {
            let mut batch = pool.batch(8);
            for i in 0..5 {
                let slot = batch.next_slot();
                if i == fail_at {
                    return Err(format!("row {} failed", i));
                }
                slot.id = i as i64 + 1;
            }
            Ok(batch.into_inner())
        };

        assert!(fill(3).is_err());
        assert_eq!(pool.idle_count(), 4, "three filled plus the failing slot");

        let rows = fill(usize::MAX).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(pool.idle_count(), 0, "successful batch keeps its instances");
    }

    #[derive(Debug, Clone)]
    enum PoolOp {
        Acquire,
        Release { id: i64, label: String },
    }

    fn pool_op_strategy() -> impl Strategy<Value = PoolOp> {
        prop_oneof![
            Just(PoolOp::Acquire),
            (1..1000i64, "[a-z]{1,8}").prop_map(|(id, label)| PoolOp::Release { id, label }),
        ]
    }

    proptest! {
        // Whatever was released, anything acquired afterwards is neutral.
        #[test]
        fn prop_acquired_instances_are_neutral(ops in prop::collection::vec(pool_op_strategy(), 1..80)) {
            let pool: ObjectPool<Slot> = ObjectPool::new(8);
            for op in ops {
                match op {
                    PoolOp::Acquire => {
                        let slot = pool.acquire();
                        prop_assert_eq!(slot.id, 0);
                        prop_assert!(slot.label.is_empty());
                    }
                    PoolOp::Release { id, label } => pool.release(Slot { id, label }),
                }
                prop_assert!(pool.idle_count() <= 8);
            }
        }
    }
}
