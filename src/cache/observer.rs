use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast::{self, error::RecvError};

use super::entry::CacheEntry;
use super::store::{CacheEvent, Change};
use crate::key::ResourceKey;

type Reader = Arc<dyn Fn(&ResourceKey) -> Option<CacheEntry> + Send + Sync>;

/// Per-key observer counts. Shared between a store and its observers.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    counts: Mutex<HashMap<ResourceKey, usize>>,
}

impl ObserverRegistry {
    fn acquire(&self, key: &ResourceKey) {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        *counts.entry(key.clone()).or_insert(0) += 1;
    }

    fn release(&self, key: &ResourceKey) {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(count) = counts.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                counts.remove(key);
            }
        }
    }

    pub(crate) fn count(&self, key: &ResourceKey) -> usize {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        counts.get(key).copied().unwrap_or(0)
    }
}

/// A view's subscription to one cache entry.
///
/// Views derive everything they render from `current()` and re-render
/// after `changed()` resolves. Dropping the observer unregisters it, so an
/// unmounted view no longer triggers refetches on invalidation.
pub struct Observer {
    key: ResourceKey,
    receiver: broadcast::Receiver<CacheEvent>,
    reader: Reader,
    registry: Arc<ObserverRegistry>,
}

impl Observer {
    pub(crate) fn new(
        key: ResourceKey,
        receiver: broadcast::Receiver<CacheEvent>,
        reader: Reader,
        registry: Arc<ObserverRegistry>,
    ) -> Self {
        registry.acquire(&key);
        Self {
            key,
            receiver,
            reader,
            registry,
        }
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub fn current(&self) -> Option<CacheEntry> {
        (self.reader)(&self.key)
    }

    /// Wait for the next change to this key. Returns `None` once the store
    /// is gone. Missed notifications collapse into one.
    pub async fn changed(&mut self) -> Option<CacheEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.key == self.key => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(_)) => {
                    let version = self.current().map(|e| e.version).unwrap_or(0);
                    return Some(CacheEvent {
                        key: self.key.clone(),
                        version,
                        change: Change::Written,
                    });
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}
