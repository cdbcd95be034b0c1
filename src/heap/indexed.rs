//! Indexed Heap Module
//!
//! Bounded binary min-heap with a key index for O(1) lookup and in-place
//! priority changes.
//!
//! Slots are numbered from 1 so that the parent of slot `k` is `k / 2` and its
//! children are `2k` and `2k + 1`. Slot `k` is stored at `entries[k - 1]`.

use std::collections::HashMap;
use std::ops::Deref;

use tracing::trace;

use crate::check::require_positive;
use crate::config::Config;
use crate::error::{ContainerError, Result};
use crate::heap::HeapEntry;

// == Indexed Heap ==
/// Fixed-capacity min-heap over [`HeapEntry`] values, keyed by `i64`.
///
/// The heap never grows past the capacity given at construction and never
/// evicts on its own: inserting into a full heap fails until the caller pops.
#[derive(Debug)]
pub struct IndexedHeap<V> {
    /// Heap-ordered entries, slot `k` at position `k - 1`
    entries: Vec<HeapEntry<V>>,
    /// Key to current slot
    index: HashMap<i64, usize>,
    /// Maximum number of entries
    capacity: usize,
}

impl<V> IndexedHeap<V> {
    // == Constructor ==
    /// Creates an empty heap holding at most `capacity` entries.
    ///
    /// # Errors
    /// `InvalidArgument` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = require_positive("capacity", capacity)?;
        Ok(Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            capacity,
        })
    }

    /// Creates a heap sized by `config.heap_capacity`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.heap_capacity)
    }

    // == Size ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true when another insert would fail.
    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    // == Peek Min ==
    /// Returns the entry with the smallest `(priority, key)`.
    pub fn peek_min(&self) -> Option<&HeapEntry<V>> {
        self.entries.first()
    }

    // == Pop Min ==
    /// Removes and returns the entry with the smallest `(priority, key)`.
    ///
    /// # Errors
    /// `EmptyStructure` if the heap is empty.
    pub fn pop_min(&mut self) -> Result<HeapEntry<V>> {
        if self.entries.is_empty() {
            return Err(ContainerError::EmptyStructure);
        }
        self.remove_at(1).ok_or(ContainerError::EmptyStructure)
    }

    // == Lookup ==
    /// Returns the entry stored under `key`.
    pub fn lookup(&self, key: i64) -> Option<&HeapEntry<V>> {
        self.index.get(&key).map(|&slot| self.at(slot))
    }

    pub fn contains_key(&self, key: i64) -> bool {
        self.index.contains_key(&key)
    }

    /// Returns a guard for changing the priority or value of the entry
    /// stored under `key`.
    ///
    /// Heap order is restored when the guard is dropped.
    pub fn lookup_mut(&mut self, key: i64) -> Option<EntryMut<'_, V>> {
        let slot = *self.index.get(&key)?;
        Some(EntryMut { heap: self, slot })
    }

    /// Sets the priority of the entry stored under `key`.
    ///
    /// Returns false if the key is not present.
    pub fn set_priority(&mut self, key: i64, priority: i64) -> bool {
        match self.lookup_mut(key) {
            Some(mut entry) => {
                entry.set_priority(priority);
                true
            }
            None => false,
        }
    }

    // == Insert ==
    /// Adds an entry.
    ///
    /// # Errors
    /// - `CapacityExceeded` if the heap is full
    /// - `DuplicateKey` if an entry with the same key is present
    pub fn insert(&mut self, entry: HeapEntry<V>) -> Result<()> {
        if self.is_full() {
            return Err(ContainerError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        if self.index.contains_key(&entry.key()) {
            return Err(ContainerError::DuplicateKey(entry.key()));
        }

        let key = entry.key();
        self.entries.push(entry);
        let slot = self.entries.len();
        self.index.insert(key, slot);
        self.swim(slot);
        Ok(())
    }

    // == Remove ==
    /// Removes the entry stored under `key`, wherever it sits in the heap.
    pub fn remove(&mut self, key: i64) -> Option<HeapEntry<V>> {
        let slot = *self.index.get(&key)?;
        self.remove_at(slot)
    }

    // == Clear ==
    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    // == Iteration ==
    /// Iterates over all entries in storage order.
    pub fn iter(&self) -> std::slice::Iter<'_, HeapEntry<V>> {
        self.entries.iter()
    }

    /// Pops entries in `(priority, key)` order.
    ///
    /// Entries not consumed before the iterator is dropped stay in the heap.
    pub fn drain_sorted(&mut self) -> impl Iterator<Item = HeapEntry<V>> + '_ {
        std::iter::from_fn(move || self.pop_min().ok())
    }

    // == Internals ==
    fn at(&self, slot: usize) -> &HeapEntry<V> {
        &self.entries[slot - 1]
    }

    fn less(&self, a: usize, b: usize) -> bool {
        self.at(a).rank() < self.at(b).rank()
    }

    /// Swaps two slots and re-points both keys in the index.
    fn exchange(&mut self, a: usize, b: usize) {
        self.entries.swap(a - 1, b - 1);
        let (key_a, key_b) = (self.at(a).key(), self.at(b).key());
        self.index.insert(key_a, a);
        self.index.insert(key_b, b);
    }

    /// Moves the entry at `slot` toward the root. Returns its final slot.
    fn swim(&mut self, mut slot: usize) -> usize {
        while slot > 1 && self.less(slot, slot / 2) {
            self.exchange(slot, slot / 2);
            slot /= 2;
        }
        slot
    }

    /// Moves the entry at `slot` toward the leaves. Returns its final slot.
    fn sink(&mut self, mut slot: usize) -> usize {
        let len = self.entries.len();
        while 2 * slot <= len {
            let mut child = 2 * slot;
            if child < len && self.less(child + 1, child) {
                child += 1;
            }
            if !self.less(child, slot) {
                break;
            }
            self.exchange(slot, child);
            slot = child;
        }
        slot
    }

    /// Restores heap order around an entry whose priority may have moved in
    /// either direction.
    fn reheapify(&mut self, slot: usize) {
        let slot = self.sink(slot);
        self.swim(slot);
    }

    fn remove_at(&mut self, slot: usize) -> Option<HeapEntry<V>> {
        let last = self.entries.len();
        if slot == 0 || slot > last {
            return None;
        }
        if slot != last {
            self.exchange(slot, last);
        }

        let removed = self.entries.pop()?;
        self.index.remove(&removed.key());

        if slot <= self.entries.len() {
            self.reheapify(slot);
        }
        Some(removed)
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(self.entries.len(), self.index.len(), "index size mismatch");
        for slot in 1..=self.entries.len() {
            let key = self.at(slot).key();
            assert_eq!(self.index.get(&key), Some(&slot), "index stale for key {}", key);
            if slot > 1 {
                assert!(
                    !self.less(slot, slot / 2),
                    "heap order violated at slot {}",
                    slot
                );
            }
        }
    }
}

impl<'a, V> IntoIterator for &'a IndexedHeap<V> {
    type Item = &'a HeapEntry<V>;
    type IntoIter = std::slice::Iter<'a, HeapEntry<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// == Entry Guard ==
/// Mutable access to an entry inside an [`IndexedHeap`].
///
/// Reads go through `Deref`. Writes are limited to the priority and the
/// value, so the key and the index stay in step. Heap order is restored when
/// the guard goes out of scope.
///
/// ```compile_fail
/// use bounded_containers::{HeapEntry, IndexedHeap};
///
/// let mut heap = IndexedHeap::new(2).unwrap();
/// heap.insert(HeapEntry::new(1, 10, ())).unwrap();
/// heap.insert(HeapEntry::new(2, 20, ())).unwrap();
/// *heap.lookup_mut(2).unwrap() = HeapEntry::new(1, 5, ());
/// ```
pub struct EntryMut<'a, V> {
    heap: &'a mut IndexedHeap<V>,
    slot: usize,
}

impl<V> Deref for EntryMut<'_, V> {
    type Target = HeapEntry<V>;

    fn deref(&self) -> &HeapEntry<V> {
        self.heap.at(self.slot)
    }
}

impl<V> EntryMut<'_, V> {
    fn entry_mut(&mut self) -> &mut HeapEntry<V> {
        &mut self.heap.entries[self.slot - 1]
    }

    /// Mutable access to the priority. Order is restored on drop.
    pub fn priority_mut(&mut self) -> &mut i64 {
        &mut self.entry_mut().priority
    }

    pub fn set_priority(&mut self, priority: i64) {
        self.entry_mut().priority = priority;
    }

    /// Mutable access to the value.
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.entry_mut().value
    }

    pub fn set_value(&mut self, value: V) {
        self.entry_mut().value = value;
    }
}

impl<V> Drop for EntryMut<'_, V> {
    fn drop(&mut self) {
        trace!(slot = self.slot, "priority changed, restoring heap order");
        self.heap.reheapify(self.slot);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn heap_with(capacity: usize, items: &[(i64, i64)]) -> IndexedHeap<String> {
        let mut heap = IndexedHeap::new(capacity).unwrap();
        for &(key, priority) in items {
            heap.insert(HeapEntry::new(key, priority, format!("v{}", key)))
                .unwrap();
        }
        heap
    }

    fn pop_keys(heap: &mut IndexedHeap<String>) -> Vec<i64> {
        heap.drain_sorted().map(|e| e.key()).collect()
    }

    #[test]
    fn test_heap_new_rejects_zero_capacity() {
        let result = IndexedHeap::<()>::new(0);
        assert!(matches!(result, Err(ContainerError::InvalidArgument(_))));
    }

    #[test]
    fn test_heap_new_is_empty() {
        let heap = IndexedHeap::<()>::new(4).unwrap();
        assert_eq!(heap.len(), 0);
        assert!(heap.is_empty());
        assert!(!heap.is_full());
        assert_eq!(heap.capacity(), 4);
        assert!(heap.peek_min().is_none());
    }

    #[test]
    fn test_heap_fill_then_insert_fails() {
        let mut heap = heap_with(3, &[(1, 10), (2, 20), (3, 30)]);
        assert!(heap.is_full());

        let result = heap.insert(HeapEntry::new(4, 0, "v4".to_string()));
        assert_eq!(result, Err(ContainerError::CapacityExceeded { capacity: 3 }));
        assert_eq!(heap.len(), 3);
        assert!(heap.lookup(4).is_none());
    }

    #[test]
    fn test_heap_duplicate_key_rejected() {
        let mut heap = heap_with(4, &[(1, 10)]);

        let result = heap.insert(HeapEntry::new(1, 5, "other".to_string()));
        assert_eq!(result, Err(ContainerError::DuplicateKey(1)));
        assert_eq!(heap.lookup(1).unwrap().priority, 10);
        assert_eq!(heap.lookup(1).unwrap().value, "v1");
    }

    #[test]
    fn test_heap_pop_empty_fails() {
        let mut heap = IndexedHeap::<()>::new(1).unwrap();
        assert_eq!(heap.pop_min(), Err(ContainerError::EmptyStructure));
    }

    #[test]
    fn test_heap_pops_in_priority_order() {
        let mut heap = heap_with(8, &[(1, 50), (2, 10), (3, 40), (4, 20), (5, 30)]);
        heap.assert_invariants();

        assert_eq!(pop_keys(&mut heap), vec![2, 4, 5, 3, 1]);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_heap_ties_pop_by_key() {
        let mut heap = heap_with(8, &[(9, 1), (3, 1), (7, 0), (5, 1), (1, 1)]);
        assert_eq!(pop_keys(&mut heap), vec![7, 1, 3, 5, 9]);
    }

    #[test]
    fn test_heap_negative_priorities_and_keys() {
        let mut heap = heap_with(4, &[(-1, 0), (2, -5), (-3, -5)]);
        assert_eq!(pop_keys(&mut heap), vec![-3, 2, -1]);
    }

    #[test]
    fn test_heap_lookup_after_pop_is_absent() {
        let mut heap = heap_with(4, &[(1, 10), (2, 20)]);

        let popped = heap.pop_min().unwrap();
        assert_eq!(popped.key(), 1);
        assert!(heap.lookup(1).is_none());
        assert!(!heap.contains_key(1));
        assert_eq!(heap.lookup(2).unwrap().value, "v2");
    }

    #[test]
    fn test_heap_priority_decrease_moves_to_root() {
        let mut heap = heap_with(8, &[(1, 10), (2, 20), (3, 30), (4, 40)]);

        {
            let mut entry = heap.lookup_mut(4).unwrap();
            *entry.priority_mut() = 5;
        }
        heap.assert_invariants();
        assert_eq!(heap.peek_min().unwrap().key(), 4);
    }

    #[test]
    fn test_heap_priority_increase_moves_root_down() {
        let mut heap = heap_with(8, &[(1, 10), (2, 20), (3, 30), (4, 40)]);

        assert!(heap.set_priority(1, 35));
        heap.assert_invariants();
        assert_eq!(heap.peek_min().unwrap().key(), 2);
        assert_eq!(pop_keys(&mut heap), vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_heap_set_priority_missing_key() {
        let mut heap = heap_with(2, &[(1, 10)]);
        assert!(!heap.set_priority(99, 0));
        heap.assert_invariants();
    }

    #[test]
    fn test_heap_value_mut_through_guard() {
        let mut heap = heap_with(2, &[(1, 10)]);

        heap.lookup_mut(1).unwrap().value_mut().push_str("-updated");
        assert_eq!(heap.lookup(1).unwrap().value, "v1-updated");
    }

    #[test]
    fn test_heap_guard_writes_keep_key_and_index() {
        let mut heap = heap_with(4, &[(1, 10), (2, 20)]);

        {
            let mut entry = heap.lookup_mut(2).unwrap();
            entry.set_priority(5);
            entry.set_value("replaced".to_string());
            assert_eq!(entry.key(), 2);
        }
        heap.assert_invariants();

        let mut keys: Vec<i64> = heap.iter().map(|e| e.key()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2]);
        assert_eq!(heap.lookup(2).map(|e| (e.key(), e.priority)), Some((2, 5)));
        assert_eq!(heap.lookup(1).map(|e| (e.key(), e.priority)), Some((1, 10)));
        assert_eq!(heap.peek_min().unwrap().value, "replaced");
    }

    #[test]
    fn test_heap_remove_arbitrary_key() {
        let mut heap = heap_with(8, &[(1, 10), (2, 20), (3, 30), (4, 40), (5, 50)]);

        let removed = heap.remove(2).unwrap();
        assert_eq!(removed.into_value(), "v2");
        heap.assert_invariants();
        assert!(heap.remove(2).is_none());
        assert_eq!(pop_keys(&mut heap), vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_heap_remove_last_slot() {
        let mut heap = heap_with(4, &[(1, 10), (2, 20)]);

        assert!(heap.remove(2).is_some());
        heap.assert_invariants();
        assert_eq!(heap.len(), 1);
    }

    #[test]
    fn test_heap_reinsert_after_pop() {
        let mut heap = heap_with(2, &[(1, 10), (2, 20)]);

        let mut entry = heap.pop_min().unwrap();
        entry.priority = 30;
        heap.insert(entry).unwrap();

        assert_eq!(pop_keys(&mut heap), vec![2, 1]);
    }

    #[test]
    fn test_heap_iter_visits_all() {
        let heap = heap_with(4, &[(3, 1), (1, 2), (2, 3)]);

        let mut keys: Vec<i64> = heap.iter().map(|e| e.key()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2, 3]);
        assert_eq!((&heap).into_iter().count(), 3);
    }

    #[test]
    fn test_heap_clear() {
        let mut heap = heap_with(4, &[(1, 1), (2, 2)]);

        heap.clear();
        assert!(heap.is_empty());
        assert!(heap.lookup(1).is_none());
        heap.insert(HeapEntry::new(1, 0, "again".to_string())).unwrap();
        heap.assert_invariants();
    }

    #[test]
    fn test_heap_clear_empty_is_noop() {
        let mut heap = IndexedHeap::<()>::new(2).unwrap();
        heap.clear();
        assert_eq!(heap.len(), 0);
    }

    #[test]
    fn test_heap_from_config() {
        let config = Config {
            heap_capacity: 16,
            ..Config::default()
        };
        let heap = IndexedHeap::<()>::from_config(&config).unwrap();
        assert_eq!(heap.capacity(), 16);
    }
}
