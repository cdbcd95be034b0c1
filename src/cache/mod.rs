//! Cache Module
//!
//! Provides a fixed-capacity LRU cache and a time-expiring cache built on it.

mod entry;
mod expiring;
mod lru;
mod stats;


use std::time::Duration;

// Re-export public types
pub use entry::Timestamped;
pub use expiring::ExpiringCache;
pub use lru::{Iter, LruCache};
pub use stats::CacheStats;

// == Public Constants ==
/// TTL used by [`ExpiringCache::new`]
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

// == Bounded Cache Trait ==
/// Operations shared by every cache variant, so callers can swap one for
/// another.
pub trait BoundedCache<K, V> {
    /// Returns the value for `key`, marking it most recently used.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Stores a value, returning the previous live value for the key.
    fn put(&mut self, key: K, value: V) -> Option<V>;

    /// Removes an entry, returning its live value.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Checks for a live entry without changing recency.
    fn contains_key(&self, key: &K) -> bool;

    fn clear(&mut self);

    /// Number of occupied slots.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    /// Flushes pending work. Caches that buffer nothing keep the default.
    fn finish(&mut self) {}
}
