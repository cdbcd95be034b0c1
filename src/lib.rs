//! Bounded Containers - index-assisted building blocks
//!
//! Provides an indexed min-priority queue with in-place priority updates, a
//! fixed-capacity LRU cache, and a TTL cache layered on the LRU cache.
//!
//! None of the containers synchronize internally. Wrap them in a lock at the
//! call site when sharing across threads.

pub mod cache;
pub mod check;
pub mod clock;
pub mod config;
pub mod error;
pub mod heap;

pub use cache::{BoundedCache, CacheStats, ExpiringCache, LruCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{ContainerError, Result};
pub use heap::{EntryMut, HeapEntry, IndexedHeap};
