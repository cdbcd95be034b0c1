//! Cache Entry Module
//!
//! Defines the timestamped wrapper stored by the expiring cache.

// == Timestamped Value ==
/// A cached value together with the time it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Timestamped<V> {
    /// The stored value
    pub value: V,
    /// Insertion time in milliseconds, as read from the cache's clock
    pub inserted_at_ms: u64,
}

impl<V> Timestamped<V> {
    // == Constructor ==
    pub fn new(value: V, inserted_at_ms: u64) -> Self {
        Self {
            value,
            inserted_at_ms,
        }
    }

    // == Age ==
    /// Milliseconds since insertion. A clock reading earlier than the
    /// insertion time counts as age zero.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.inserted_at_ms)
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `ttl_ms`.
    ///
    /// Boundary condition: an entry is live while `age < ttl` and expired
    /// from the moment `age == ttl`.
    pub fn is_expired(&self, now_ms: u64, ttl_ms: u64) -> bool {
        self.age_ms(now_ms) >= ttl_ms
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, 0 once expired.
    pub fn remaining_ms(&self, now_ms: u64, ttl_ms: u64) -> u64 {
        ttl_ms.saturating_sub(self.age_ms(now_ms))
    }
}
