//! Queries - reading server data into the cache and refetching it.
//!
//! A query pairs a resource key with the GET request that produces it. The
//! request is remembered as the key's source so an invalidation can refetch
//! the entry in the background while a view observes it.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tokio::task::JoinHandle;

use crate::cache::{CacheStore, EntryStatus, InMemoryCacheStore};
use crate::client::{ApiRequest, ClientError, RemoteClient};
use crate::key::ResourceKey;

/// Cache store plus the client that fills it. Clone-friendly.
pub struct QueryClient<C, S = InMemoryCacheStore> {
    store: S,
    client: Arc<C>,
    sources: Arc<RwLock<HashMap<ResourceKey, ApiRequest>>>,
}

impl<C, S: Clone> Clone for QueryClient<C, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            client: self.client.clone(),
            sources: self.sources.clone(),
        }
    }
}

impl<C: RemoteClient> QueryClient<C, InMemoryCacheStore> {
    /// A client with a fresh in-memory cache.
    pub fn new(client: C) -> Self {
        Self::with_store(client, InMemoryCacheStore::new())
    }
}

impl<C, S> QueryClient<C, S>
where
    C: RemoteClient,
    S: CacheStore + Clone + 'static,
{
    /// A client over an existing store, e.g. one shared with views.
    pub fn with_store(client: C, store: S) -> Self {
        Self::from_parts(Arc::new(client), store)
    }

    /// Share one remote client between several query clients.
    pub fn from_parts(client: Arc<C>, store: S) -> Self {
        Self {
            store,
            client,
            sources: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The store every view observes.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Fetch `key` from the server and record the result in the cache.
    /// On failure the last known-good value is kept and the error is stored
    /// as the entry's status.
    pub async fn fetch(&self, key: &ResourceKey, request: ApiRequest) -> Result<Value, ClientError> {
        self.sources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), request.clone());

        self.store.set_status(key, EntryStatus::Loading);
        match self.client.call(request).await {
            Ok(value) => {
                self.store.record_fetch(key, value.clone());
                tracing::debug!(%key, "query.fetched");
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "query.fetch failed");
                self.store.set_status(key, EntryStatus::Error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Cached value when present and fresh, otherwise a fetch.
    pub async fn ensure(&self, key: &ResourceKey, request: ApiRequest) -> Result<Value, ClientError> {
        if let Some(entry) = self.store.read(key) {
            if let (Some(value), false) = (entry.value, entry.stale) {
                return Ok(value);
            }
        }
        self.fetch(key, request).await
    }

    /// Re-run the key's registered source. `None` if it was never fetched.
    pub async fn refetch(&self, key: &ResourceKey) -> Option<Result<Value, ClientError>> {
        let request = self.source(key)?;
        Some(self.fetch(key, request).await)
    }

    /// Mark `key` stale. When a view observes it and a source is known,
    /// refetch in the background and return the task handle.
    pub fn invalidate(&self, key: &ResourceKey) -> Option<JoinHandle<()>> {
        let observed = self.store.invalidate(key);
        if !observed {
            return None;
        }
        let request = self.source(key)?;
        let query = self.clone();
        let key = key.clone();
        Some(tokio::spawn(async move {
            // Failures are recorded on the entry by `fetch`.
            let _ = query.fetch(&key, request).await;
        }))
    }

    fn source(&self, key: &ResourceKey) -> Option<ApiRequest> {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}
