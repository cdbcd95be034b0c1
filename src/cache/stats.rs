//! Read and eviction counters shared by [`LruCache`](super::LruCache) and
//! [`ExpiringCache`](super::ExpiringCache).

use serde::Serialize;

/// Result of a single cache read, as seen by the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    Hit,
    /// No entry under the key.
    Absent,
    /// An entry was present but past its TTL. Callers see it as absent.
    Expired,
}

/// Snapshot of a cache's counters.
///
/// `misses` counts every read that returned nothing, so an expired read is
/// counted in both `misses` and `expirations`. `total_entries` is physical
/// occupancy and may include expired entries not yet evicted or purged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped to make room for a new key.
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total reads recorded.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// `hits / lookups`, or 0.0 before the first read.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    pub(crate) fn record(&mut self, lookup: Lookup) {
        match lookup {
            Lookup::Hit => self.hits += 1,
            Lookup::Absent => self.misses += 1,
            Lookup::Expired => {
                self.misses += 1;
                self.expirations += 1;
            }
        }
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Stamps occupancy onto a copy of the counters.
    pub(crate) fn snapshot(&self, total_entries: usize) -> Self {
        Self {
            total_entries,
            ..self.clone()
        }
    }
}
