//! Heap Entry Module
//!
//! Defines the (key, priority, value) triple stored by the indexed heap.

// == Heap Entry ==
/// A keyed entry with a mutable priority.
///
/// The key is fixed at construction. Entries order by `(priority, key)`
/// ascending, so two distinct entries never compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapEntry<V> {
    key: i64,
    /// Ordering priority, lower pops first
    pub priority: i64,
    /// Caller payload
    pub value: V,
}

impl<V> HeapEntry<V> {
    // == Constructor ==
    /// Creates a new entry.
    pub fn new(key: i64, priority: i64, value: V) -> Self {
        Self {
            key,
            priority,
            value,
        }
    }

    /// Returns the entry's key.
    pub fn key(&self) -> i64 {
        self.key
    }

    /// Consumes the entry and returns its value.
    pub fn into_value(self) -> V {
        self.value
    }

    // == Ordering Key ==
    pub(crate) fn rank(&self) -> (i64, i64) {
        (self.priority, self.key)
    }
}
