//! LRU Cache Module
//!
//! Fixed-capacity map that evicts the least recently used entry on overflow.
//!
//! Entries live in a compact node vector threaded into a doubly-linked
//! recency list:
//! - `head` = Most recently used
//! - `tail` = Least recently used
//!
//! A hash map from key to node position makes lookup, promotion, insertion
//! and eviction O(1).

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use tracing::debug;

use crate::cache::stats::Lookup;
use crate::cache::{BoundedCache, CacheStats};
use crate::check::require_positive;
use crate::config::Config;
use crate::error::Result;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Cache ==
/// Capacity-bounded cache ordered by recency of access.
///
/// `get` and `put` move a key to the most recent end. `peek` and
/// `contains_key` never change the order.
#[derive(Debug)]
pub struct LruCache<K, V> {
    /// Key to position in `nodes`
    map: HashMap<K, usize>,
    /// Entry storage, densely packed
    nodes: Vec<Node<K, V>>,
    head: Option<usize>,
    tail: Option<usize>,
    capacity: usize,
    stats: CacheStats,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `max_size` entries.
    ///
    /// # Errors
    /// `InvalidArgument` if `max_size` is zero.
    pub fn new(max_size: usize) -> Result<Self> {
        let capacity = require_positive("max_size", max_size)?;
        Ok(Self {
            map: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            capacity,
            stats: CacheStats::new(),
        })
    }

    /// Creates a cache sized by `config.max_entries`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.max_entries)
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    ///
    /// A miss leaves the cache contents untouched.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.map.get(key).copied() {
            Some(idx) => {
                self.stats.record(Lookup::Hit);
                self.touch(idx);
                Some(&self.nodes[idx].value)
            }
            None => {
                self.stats.record(Lookup::Absent);
                None
            }
        }
    }

    // == Peek ==
    /// Returns the value for `key` without changing recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).map(|&idx| &self.nodes[idx].value)
    }

    // == Contains ==
    /// Checks if a key is present. Does not change recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    // == Put ==
    /// Stores a value and marks the key most recently used.
    ///
    /// Returns the previous value if the key was present. Inserting a new key
    /// into a full cache evicts the least recently used entry first.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&idx) = self.map.get(&key) {
            let previous = std::mem::replace(&mut self.nodes[idx].value, value);
            self.touch(idx);
            return Some(previous);
        }

        if self.nodes.len() >= self.capacity && self.pop_lru().is_some() {
            self.stats.record_eviction();
            debug!(capacity = self.capacity, "evicted least recently used entry");
        }

        let idx = self.nodes.len();
        self.nodes.push(Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.map.insert(key, idx);
        self.push_front(idx);
        None
    }

    // == Remove ==
    /// Removes an entry, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.map.get(key).copied()?;
        Some(self.remove_node(idx).1)
    }

    // == Pop LRU ==
    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let idx = self.tail?;
        Some(self.remove_node(idx))
    }

    /// Returns the least recently used entry without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.tail.map(|idx| {
            let node = &self.nodes[idx];
            (&node.key, &node.value)
        })
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Iteration ==
    /// Iterates from most to least recently used. Does not change recency.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
            remaining: self.nodes.len(),
        }
    }

    /// Snapshot of all entries, most recently used first.
    pub fn entries(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Snapshot of all keys, most recently used first.
    pub fn keys(&self) -> Vec<K> {
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.nodes.len())
    }

    // == Recency List ==
    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[idx].prev = None;
        self.nodes[idx].next = None;
    }

    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].prev = None;
        self.nodes[idx].next = self.head;
        match self.head {
            Some(h) => self.nodes[h].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn touch(&mut self, idx: usize) {
        if self.head != Some(idx) {
            self.detach(idx);
            self.push_front(idx);
        }
    }

    /// Unlinks and removes the node at `idx`. The last node is moved into the
    /// hole so storage stays dense.
    fn remove_node(&mut self, idx: usize) -> (K, V) {
        self.detach(idx);
        let node = self.nodes.swap_remove(idx);
        self.map.remove(&node.key);

        if idx < self.nodes.len() {
            let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
            match prev {
                Some(p) => self.nodes[p].next = Some(idx),
                None => self.head = Some(idx),
            }
            match next {
                Some(n) => self.nodes[n].prev = Some(idx),
                None => self.tail = Some(idx),
            }
            if let Some(slot) = self.map.get_mut(&self.nodes[idx].key) {
                *slot = idx;
            }
        }

        (node.key, node.value)
    }
}

impl<K, V> BoundedCache<K, V> for LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        LruCache::get(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        LruCache::put(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        LruCache::remove(self, key)
    }

    fn contains_key(&self, key: &K) -> bool {
        LruCache::contains_key(self, key)
    }

    fn clear(&mut self) {
        LruCache::clear(self)
    }

    fn len(&self) -> usize {
        LruCache::len(self)
    }

    fn capacity(&self) -> usize {
        LruCache::capacity(self)
    }
}

// == Iterator ==
/// Borrowing iterator over an [`LruCache`], most recently used first.
pub struct Iter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let node = &nodes[self.cursor?];
        self.cursor = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContainerError;

    fn filled(capacity: usize, keys: &[i32]) -> LruCache<i32, String> {
        let mut lru = LruCache::new(capacity).unwrap();
        for &k in keys {
            lru.put(k, format!("v{}", k));
        }
        lru
    }

    fn order(lru: &LruCache<i32, String>) -> Vec<i32> {
        lru.keys()
    }

    #[test]
    fn test_lru_new() {
        let lru = LruCache::<i32, i32>::new(3).unwrap();
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.capacity(), 3);
        assert!(lru.peek_lru().is_none());
    }

    #[test]
    fn test_lru_new_rejects_zero() {
        let result = LruCache::<i32, i32>::new(0);
        assert!(matches!(result, Err(ContainerError::InvalidArgument(_))));
    }

    #[test]
    fn test_lru_put_new_keys() {
        let lru = filled(3, &[1, 2, 3]);

        assert_eq!(lru.len(), 3);
        // key 1 is oldest (added first)
        assert_eq!(lru.peek_lru(), Some((&1, &"v1".to_string())));
        assert_eq!(order(&lru), vec![3, 2, 1]);
    }

    #[test]
    fn test_lru_put_evicts_oldest() {
        let mut lru = filled(3, &[1, 2, 3]);

        assert_eq!(lru.put(4, "v4".to_string()), None);

        assert_eq!(lru.len(), 3);
        assert!(!lru.contains_key(&1));
        assert!(lru.contains_key(&2));
        assert!(lru.contains_key(&3));
        assert!(lru.contains_key(&4));
        assert_eq!(lru.stats().evictions, 1);
    }

    #[test]
    fn test_lru_get_promotes() {
        let mut lru = filled(3, &[1, 2, 3]);

        assert_eq!(lru.get(&1), Some(&"v1".to_string()));
        lru.put(4, "v4".to_string());

        assert!(lru.contains_key(&1));
        assert!(!lru.contains_key(&2));
        assert_eq!(order(&lru), vec![4, 1, 3]);
    }

    #[test]
    fn test_lru_reput_refreshes_recency() {
        let mut lru = filled(3, &[1, 2, 3]);

        assert_eq!(lru.put(1, "one".to_string()), Some("v1".to_string()));
        lru.put(4, "v4".to_string());

        assert_eq!(lru.peek(&1), Some(&"one".to_string()));
        assert!(!lru.contains_key(&2));
    }

    #[test]
    fn test_lru_contains_key_does_not_promote() {
        let mut lru = filled(3, &[1, 2, 3]);

        assert!(lru.contains_key(&1));
        assert_eq!(lru.peek(&1), Some(&"v1".to_string()));
        lru.put(4, "v4".to_string());

        assert!(!lru.contains_key(&1));
    }

    #[test]
    fn test_lru_get_missing_does_not_insert() {
        let mut lru = filled(3, &[1, 2]);

        assert_eq!(lru.get(&9), None);
        assert_eq!(lru.len(), 2);
        assert!(!lru.contains_key(&9));
        assert_eq!(order(&lru), vec![2, 1]);
        assert_eq!(lru.stats().misses, 1);
    }

    #[test]
    fn test_lru_remove() {
        let mut lru = filled(4, &[1, 2, 3]);

        assert_eq!(lru.remove(&2), Some("v2".to_string()));

        assert_eq!(lru.len(), 2);
        assert!(!lru.contains_key(&2));
        assert_eq!(order(&lru), vec![3, 1]);
    }

    #[test]
    fn test_lru_remove_nonexistent_key() {
        let mut lru = filled(3, &[1, 2]);

        // Remove a key that doesn't exist - should not panic or affect existing keys
        assert_eq!(lru.remove(&42), None);

        assert_eq!(lru.len(), 2);
        assert!(lru.contains_key(&1));
        assert!(lru.contains_key(&2));
    }

    #[test]
    fn test_lru_remove_then_reuse_space() {
        let mut lru = filled(3, &[1, 2, 3]);

        lru.remove(&1);
        lru.remove(&3);
        lru.put(4, "v4".to_string());
        lru.put(5, "v5".to_string());

        assert_eq!(lru.len(), 3);
        assert_eq!(order(&lru), vec![5, 4, 2]);
        assert_eq!(lru.stats().evictions, 0);
    }

    #[test]
    fn test_lru_order_after_multiple_touches() {
        let mut lru = filled(3, &[1, 2, 3]);

        // put: [3, 2, 1]; get(1): [1, 3, 2]; get(3): [3, 1, 2]; get(2): [2, 3, 1]
        lru.get(&1);
        lru.get(&3);
        lru.get(&2);

        assert_eq!(lru.pop_lru().map(|(k, _)| k), Some(1));
        assert_eq!(lru.pop_lru().map(|(k, _)| k), Some(3));
        assert_eq!(lru.pop_lru().map(|(k, _)| k), Some(2));
        assert_eq!(lru.pop_lru(), None);
    }

    #[test]
    fn test_lru_capacity_one() {
        let mut lru = filled(1, &[1]);

        lru.put(2, "v2".to_string());
        assert_eq!(lru.len(), 1);
        assert_eq!(lru.get(&2), Some(&"v2".to_string()));
        assert_eq!(lru.get(&1), None);
    }

    #[test]
    fn test_lru_borrowed_key_lookup() {
        let mut lru = LruCache::new(2).unwrap();
        lru.put("alpha".to_string(), 1);

        assert_eq!(lru.get("alpha"), Some(&1));
        assert!(lru.contains_key("alpha"));
        assert_eq!(lru.remove("alpha"), Some(1));
    }

    #[test]
    fn test_lru_entries_snapshot() {
        let mut lru = filled(3, &[1, 2]);

        let snapshot = lru.entries();
        lru.put(1, "changed".to_string());

        assert_eq!(snapshot, vec![(2, "v2".to_string()), (1, "v1".to_string())]);
        assert_eq!(lru.iter().len(), 2);
    }

    #[test]
    fn test_lru_clear() {
        let mut lru = filled(3, &[1, 2, 3]);

        lru.clear();
        assert!(lru.is_empty());
        assert!(lru.peek_lru().is_none());

        lru.put(7, "v7".to_string());
        assert_eq!(order(&lru), vec![7]);
    }

    #[test]
    fn test_lru_clear_empty_is_noop() {
        let mut lru = LruCache::<i32, i32>::new(2).unwrap();
        lru.clear();
        assert_eq!(lru.len(), 0);
    }

    #[test]
    fn test_lru_stats() {
        let mut lru = filled(2, &[1, 2, 3]);
        lru.get(&3); // hit
        lru.get(&1); // miss

        let stats = lru.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.total_entries, 2);
    }

    #[test]
    fn test_lru_through_trait() {
        fn exercise<C: BoundedCache<i32, &'static str>>(cache: &mut C) {
            cache.put(1, "a");
            cache.put(2, "b");
            cache.put(3, "c");
            cache.finish();
        }

        let mut lru = LruCache::new(2).unwrap();
        exercise(&mut lru);
        assert_eq!(BoundedCache::len(&lru), 2);
        assert!(!BoundedCache::contains_key(&lru, &1));
    }
}
