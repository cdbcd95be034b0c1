//! Heap Module
//!
//! Provides a bounded min-priority queue with O(1) key lookup and O(log n)
//! in-place priority updates.

mod entry;
mod indexed;


pub use entry::HeapEntry;
pub use indexed::{EntryMut, IndexedHeap};
