//! Expiring Cache Module
//!
//! LRU cache whose entries stop being visible once they outlive a TTL.
//!
//! Expiry is checked when an entry is read. Expired entries keep their slot
//! until LRU eviction, an overwrite, a removal, or an explicit
//! [`ExpiringCache::purge_expired`] call reclaims it.

use std::borrow::Borrow;
use std::hash::Hash;
use std::time::Duration;

use tracing::{debug, trace};

use crate::cache::stats::Lookup;
use crate::cache::{BoundedCache, CacheStats, LruCache, Timestamped, DEFAULT_TTL};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{ContainerError, Result};

// == Expiring Cache ==
/// LRU cache with a single time-to-live applied to every entry.
#[derive(Debug)]
pub struct ExpiringCache<K, V, C = SystemClock> {
    /// Underlying recency-ordered storage
    inner: LruCache<K, Timestamped<V>>,
    /// Time-to-live in milliseconds, always >= 1
    ttl_ms: u64,
    clock: C,
    /// Read-side counters; evictions come from `inner`
    stats: CacheStats,
}

impl<K, V> ExpiringCache<K, V, SystemClock>
where
    K: Hash + Eq + Clone,
{
    // == Constructors ==
    /// Creates a cache with the default TTL of 24 hours.
    pub fn new(max_size: usize) -> Result<Self> {
        Self::with_ttl(max_size, DEFAULT_TTL)
    }

    /// Creates a cache with an explicit TTL.
    ///
    /// # Errors
    /// `InvalidArgument` if `max_size` is zero or `ttl` is under a millisecond.
    pub fn with_ttl(max_size: usize, ttl: Duration) -> Result<Self> {
        Self::with_clock(max_size, ttl, SystemClock)
    }

    /// Creates a cache from `config.max_entries` and `config.default_ttl_ms`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_ttl(config.max_entries, config.default_ttl())
    }
}

impl<K, V, C> ExpiringCache<K, V, C>
where
    K: Hash + Eq + Clone,
    C: Clock,
{
    /// Creates a cache reading time from `clock`.
    pub fn with_clock(max_size: usize, ttl: Duration, clock: C) -> Result<Self> {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        if ttl_ms == 0 {
            return Err(ContainerError::InvalidArgument(format!(
                "ttl must be at least 1ms, got {:?}",
                ttl
            )));
        }

        Ok(Self {
            inner: LruCache::new(max_size)?,
            ttl_ms,
            clock,
            stats: CacheStats::new(),
        })
    }

    // == Get ==
    /// Returns the live value for `key`.
    ///
    /// The key is marked most recently used whenever it is physically
    /// present, even if it turns out to be expired.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_millis();
        let ttl_ms = self.ttl_ms;

        match self.inner.get(key) {
            Some(entry) if !entry.is_expired(now, ttl_ms) => {
                self.stats.record(Lookup::Hit);
                Some(&entry.value)
            }
            Some(_) => {
                self.stats.record(Lookup::Expired);
                None
            }
            None => {
                self.stats.record(Lookup::Absent);
                None
            }
        }
    }

    // == Contains ==
    /// Checks for a live entry. Does not change recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_millis();
        self.inner
            .peek(key)
            .is_some_and(|entry| !entry.is_expired(now, self.ttl_ms))
    }

    // == Put ==
    /// Stores a value stamped with the current time.
    ///
    /// Returns the previous value only if it was still live.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let now = self.clock.now_millis();
        self.inner
            .put(key, Timestamped::new(value, now))
            .and_then(|previous| self.live_value(previous, now))
    }

    // == Remove ==
    /// Removes an entry, returning its value if it was still live.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_millis();
        self.inner
            .remove(key)
            .and_then(|previous| self.live_value(previous, now))
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    // == Finish ==
    /// Lifecycle hook for callers that flush caches uniformly. Nothing is
    /// buffered, so this only logs.
    pub fn finish(&mut self) {
        trace!(entries = self.inner.len(), "expiring cache finished");
    }

    // == Snapshots ==
    /// Live entries, most recently used first. Does not change recency.
    pub fn entries(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        let now = self.clock.now_millis();
        self.inner
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now, self.ttl_ms))
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    /// Live keys, most recently used first. Does not change recency.
    pub fn keys(&self) -> Vec<K> {
        let now = self.clock.now_millis();
        self.inner
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now, self.ttl_ms))
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Time To Live ==
    /// Remaining lifetime of a live entry. Does not change recency.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_millis();
        self.inner
            .peek(key)
            .filter(|entry| !entry.is_expired(now, self.ttl_ms))
            .map(|entry| Duration::from_millis(entry.remaining_ms(now, self.ttl_ms)))
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_millis();
        let expired_keys: Vec<K> = self
            .inner
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, self.ttl_ms))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in &expired_keys {
            self.inner.remove(key);
        }

        if count > 0 {
            debug!(removed = count, "purged expired entries");
        }
        count
    }

    // == Length ==
    /// Number of occupied slots, including expired entries not yet reclaimed.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.snapshot(self.inner.len());
        stats.evictions = self.inner.stats().evictions;
        stats
    }

    fn live_value(&self, entry: Timestamped<V>, now: u64) -> Option<V> {
        (!entry.is_expired(now, self.ttl_ms)).then_some(entry.value)
    }
}

impl<K, V, C> BoundedCache<K, V> for ExpiringCache<K, V, C>
where
    K: Hash + Eq + Clone,
    C: Clock,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        ExpiringCache::get(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        ExpiringCache::put(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        ExpiringCache::remove(self, key)
    }

    fn contains_key(&self, key: &K) -> bool {
        ExpiringCache::contains_key(self, key)
    }

    fn clear(&mut self) {
        ExpiringCache::clear(self)
    }

    fn len(&self) -> usize {
        ExpiringCache::len(self)
    }

    fn capacity(&self) -> usize {
        ExpiringCache::capacity(self)
    }

    fn finish(&mut self) {
        ExpiringCache::finish(self)
    }
}
