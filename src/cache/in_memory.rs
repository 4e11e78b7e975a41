//! InMemoryCacheStore - HashMap-backed cache store shared by every view.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use serde_json::Value;
use tokio::sync::broadcast;

use super::entry::{CacheEntry, EntryStatus};
use super::observer::{Observer, ObserverRegistry};
use super::store::{CacheEvent, CacheStore, Change};
use crate::key::ResourceKey;

const EVENT_CAPACITY: usize = 256;

type Entries = HashMap<ResourceKey, CacheEntry>;

/// In-memory cache store backed by `Arc<RwLock<HashMap>>`.
///
/// Clone-friendly: cloning shares the same entries, observers, and change
/// channel. A poisoned lock is recovered rather than reported, since reads
/// and writes of plain values cannot leave an entry half-written.
#[derive(Clone)]
pub struct InMemoryCacheStore {
    entries: Arc<RwLock<Entries>>,
    observers: Arc<ObserverRegistry>,
    events: broadcast::Sender<CacheEvent>,
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            observers: Arc::new(ObserverRegistry::default()),
            events,
        }
    }

    fn entries(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn entries_mut(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, key: &ResourceKey, version: u64, change: Change) {
        // No receivers is fine: nothing is mounted.
        let _ = self.events.send(CacheEvent {
            key: key.clone(),
            version,
            change,
        });
    }

    fn replace(&self, key: &ResourceKey, value: Value, fetched: bool) -> u64 {
        let version = {
            let mut entries = self.entries_mut();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(CacheEntry::pending);
            entry.value = Some(value);
            entry.status = EntryStatus::Idle;
            entry.stale = false;
            entry.version += 1;
            if fetched {
                entry.fetched_at = Some(SystemTime::now());
            }
            entry.version
        };
        tracing::trace!(%key, version, fetched, "cache.write");
        self.notify(key, version, Change::Written);
        version
    }
}

impl CacheStore for InMemoryCacheStore {
    fn read(&self, key: &ResourceKey) -> Option<CacheEntry> {
        self.entries().get(key).cloned()
    }

    fn write(&self, key: &ResourceKey, value: Value) -> u64 {
        self.replace(key, value, false)
    }

    fn update(
        &self,
        key: &ResourceKey,
        f: &mut dyn FnMut(&Value) -> Option<Value>,
    ) -> Option<CacheEntry> {
        let (previous, version) = {
            let mut entries = self.entries_mut();
            let entry = entries.get_mut(key)?;
            let next = f(entry.value.as_ref()?)?;
            if entry.value.as_ref() == Some(&next) {
                return None;
            }
            let previous = entry.clone();
            entry.value = Some(next);
            entry.version += 1;
            (previous, entry.version)
        };
        tracing::trace!(%key, version, "cache.update");
        self.notify(key, version, Change::Written);
        Some(previous)
    }

    fn record_fetch(&self, key: &ResourceKey, value: Value) -> u64 {
        self.replace(key, value, true)
    }

    fn set_status(&self, key: &ResourceKey, status: EntryStatus) {
        let version = {
            let mut entries = self.entries_mut();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(CacheEntry::pending);
            entry.status = status;
            entry.version
        };
        self.notify(key, version, Change::Status);
    }

    fn invalidate(&self, key: &ResourceKey) -> bool {
        let version = {
            let mut entries = self.entries_mut();
            match entries.get_mut(key) {
                Some(entry) => {
                    entry.stale = true;
                    Some(entry.version)
                }
                None => None,
            }
        };
        if let Some(version) = version {
            self.notify(key, version, Change::Invalidated);
        }
        self.observers.count(key) > 0
    }

    fn remove(&self, key: &ResourceKey) -> bool {
        let removed = self.entries_mut().remove(key);
        match removed {
            Some(entry) => {
                self.notify(key, entry.version, Change::Removed);
                true
            }
            None => false,
        }
    }

    fn keys(&self) -> Vec<ResourceKey> {
        let mut keys: Vec<_> = self.entries().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn observe(&self, key: &ResourceKey) -> Observer {
        let entries = self.entries.clone();
        let reader = Arc::new(move |key: &ResourceKey| {
            entries
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(key)
                .cloned()
        });
        Observer::new(
            key.clone(),
            self.events.subscribe(),
            reader,
            self.observers.clone(),
        )
    }

    fn observer_count(&self, key: &ResourceKey) -> usize {
        self.observers.count(key)
    }

    fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }
}
