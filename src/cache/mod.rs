//! Cache store - the single shared mutable resource views render from.
//!
//! Entries hold JSON values exactly as the backend serves them, so one
//! optimistic write can reach a feed item whether it lives inside a list
//! response or a detail response.
//!
//! ## Example
//!
//! ```ignore
//! use pawcache::{CacheStore, InMemoryCacheStore, ResourceKey};
//!
//! let store = InMemoryCacheStore::new();
//! let key = ResourceKey::feed_detail("f1");
//! store.write(&key, json!({ "id": "f1", "likeCount": 41 }));
//! let mut observer = store.observe(&key);
//! ```

mod entry;
mod in_memory;
mod observer;
mod snapshot;
mod store;

pub use entry::{CacheEntry, EntryStatus};
pub use in_memory::InMemoryCacheStore;
pub use observer::Observer;
pub use snapshot::{Snapshot, SnapshotRecord};
pub use store::{CacheEvent, CacheStore, Change};
