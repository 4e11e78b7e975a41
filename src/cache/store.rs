use serde_json::Value;
use tokio::sync::broadcast;

use super::entry::{CacheEntry, EntryStatus};
use super::observer::Observer;
use crate::key::ResourceKey;

/// What happened to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Written,
    Status,
    Invalidated,
    Removed,
}

/// Change notification broadcast to every subscriber of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    pub key: ResourceKey,
    pub version: u64,
    pub change: Change,
}

/// Addressable, versioned client-side store keyed by resource identity.
///
/// None of these operations fail: the only failure surface of the cache
/// pattern is the remote client. Writes replace entries wholesale and
/// notify observers.
pub trait CacheStore: Send + Sync {
    /// Current entry, or `None` if the key was never requested.
    fn read(&self, key: &ResourceKey) -> Option<CacheEntry>;

    /// Replace the entry's value. Clears `stale`, resets status to idle,
    /// keeps `fetched_at`. Returns the new version.
    fn write(&self, key: &ResourceKey, value: Value) -> u64;

    /// Atomically replace the entry's value with `f(current)`, keeping its
    /// status and staleness. Skipped when the entry has no value or `f`
    /// returns `None` or an identical value. Returns the entry as it was
    /// before the replacement.
    fn update(
        &self,
        key: &ResourceKey,
        f: &mut dyn FnMut(&Value) -> Option<Value>,
    ) -> Option<CacheEntry>;

    /// Replace the entry's value with freshly fetched server data.
    fn record_fetch(&self, key: &ResourceKey, value: Value) -> u64;

    /// Update loading metadata, creating the entry if needed.
    fn set_status(&self, key: &ResourceKey, status: EntryStatus);

    /// Mark the entry stale. Returns whether a view currently observes it.
    fn invalidate(&self, key: &ResourceKey) -> bool;

    fn remove(&self, key: &ResourceKey) -> bool;

    fn keys(&self) -> Vec<ResourceKey>;

    fn keys_of_kind(&self, kind: &str) -> Vec<ResourceKey> {
        self.keys().into_iter().filter(|k| k.is_kind(kind)).collect()
    }

    /// Register a view's interest in one key. Dropping the observer
    /// releases the registration.
    fn observe(&self, key: &ResourceKey) -> Observer;

    fn observer_count(&self, key: &ResourceKey) -> usize;

    fn subscribe(&self) -> broadcast::Receiver<CacheEvent>;
}
