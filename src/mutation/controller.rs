//! MutationController - optimistic writes with snapshot rollback.
//!
//! For every mutation:
//!
//! 1. wait for the entity's turn in the queue,
//! 2. compute the optimistic value of every cached entry the mutation
//!    affects and capture those entries in a snapshot,
//! 3. write the optimistic values (list and detail alike),
//! 4. send the request,
//! 5. on success keep the optimistic values, or replace them with the
//!    server's payload when the mutation reconciles,
//! 6. on failure put every snapshot entry back and return the error.
//!
//! A mutation whose future is dropped before it settles rolls back as well.
//!
//! Nothing is retried.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::error::MutationError;
use super::intent::MutationIntent;
use super::mutation::Mutation;
use super::queue::MutationQueue;
use crate::cache::{CacheStore, InMemoryCacheStore, Snapshot};
use crate::client::{ClientError, RemoteClient};
use crate::key::ResourceKey;
use crate::query::QueryClient;

/// How a successful mutation settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The optimistic values stand as final.
    Confirmed,
    /// The server reports the action was already in effect. The optimistic
    /// values stand; nothing is rolled back.
    AlreadyApplied,
    /// At least one entry was replaced with server-authoritative data.
    Reconciled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settled {
    pub outcome: Outcome,
    /// Response body (`Null` when the server answered "already applied").
    pub response: Value,
    /// Entries the optimistic write touched.
    pub touched: Vec<ResourceKey>,
}

/// Per-entity count of intents issued but not yet settled.
#[derive(Default)]
struct InFlight {
    counts: Mutex<HashMap<String, usize>>,
}

struct InFlightGuard {
    id: String,
    in_flight: Arc<InFlight>,
}

impl InFlight {
    fn begin(self: &Arc<Self>, id: &str) -> InFlightGuard {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        *counts.entry(id.to_string()).or_insert(0) += 1;
        InFlightGuard {
            id: id.to_string(),
            in_flight: self.clone(),
        }
    }

    fn contains(&self, id: &str) -> bool {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        counts.contains_key(id)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut counts = self
            .in_flight
            .counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(count) = counts.get_mut(&self.id) {
            *count -= 1;
            if *count == 0 {
                counts.remove(&self.id);
            }
        }
    }
}

/// The only writer of optimistic state into the cache.
pub struct MutationController<C, S = InMemoryCacheStore> {
    query: QueryClient<C, S>,
    queue: Arc<MutationQueue>,
    in_flight: Arc<InFlight>,
}

impl<C, S: Clone> Clone for MutationController<C, S> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            queue: self.queue.clone(),
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<C, S> MutationController<C, S>
where
    C: RemoteClient,
    S: CacheStore + Clone + 'static,
{
    /// A controller with its own queue over `query`'s store.
    pub fn new(query: QueryClient<C, S>) -> Self {
        Self {
            query,
            queue: Arc::new(MutationQueue::new()),
            in_flight: Arc::new(InFlight::default()),
        }
    }

    pub fn query(&self) -> &QueryClient<C, S> {
        &self.query
    }

    pub fn store(&self) -> &S {
        self.query.store()
    }

    /// Whether an intent for this entity is running or queued. Views use
    /// this to disable the triggering control.
    pub fn is_pending(&self, entity_id: &str) -> bool {
        self.in_flight.contains(entity_id)
    }

    /// Run an intent coming from the UI.
    pub async fn mutate(&self, intent: MutationIntent) -> Result<Settled, MutationError> {
        self.run(intent.into_mutation().as_ref()).await
    }

    pub async fn mutate_scoped(
        &self,
        intent: MutationIntent,
        scope: &CancellationToken,
    ) -> Result<Settled, MutationError> {
        self.execute(intent.into_mutation().as_ref(), Some(scope))
            .await
    }

    /// Run a concrete mutation. Cannot be cancelled.
    pub async fn run(&self, mutation: &dyn Mutation) -> Result<Settled, MutationError> {
        self.execute(mutation, None).await
    }

    /// Run a mutation owned by a view. Cancelling the scope aborts the
    /// request and rolls back, so nothing is written on behalf of a view
    /// that no longer exists.
    pub async fn run_scoped(
        &self,
        mutation: &dyn Mutation,
        scope: &CancellationToken,
    ) -> Result<Settled, MutationError> {
        self.execute(mutation, Some(scope)).await
    }

    async fn execute(
        &self,
        mutation: &dyn Mutation,
        scope: Option<&CancellationToken>,
    ) -> Result<Settled, MutationError> {
        let entity = mutation.entity_id();
        let _in_flight = self.in_flight.begin(&entity);

        let _slot = match scope {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return Err(MutationError::Cancelled),
                slot = self.queue.acquire(&entity) => slot,
            },
            None => self.queue.acquire(&entity).await,
        };

        let pending = Pending {
            store: self.store(),
            mutation,
            snapshot: Some(self.apply_optimistic(mutation)),
        };
        let request = mutation.request();
        tracing::debug!(
            mutation = mutation.name(),
            %entity,
            %request,
            touched = pending.len(),
            "mutation.optimistic"
        );

        let result = match scope {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(MutationError::Cancelled),
                result = self.query.client().call(request) => Ok(result),
            },
            None => Ok(self.query.client().call(request).await),
        };

        match result {
            Ok(Ok(response)) => match mutation.rejected(&response) {
                None => Ok(self.settle(mutation, pending.keep(), response)),
                Some(reason) => {
                    tracing::warn!(mutation = mutation.name(), %entity, %reason, "mutation.rollback");
                    pending.roll_back();
                    Err(MutationError::Rejected(reason))
                }
            },
            Ok(Err(ClientError::AlreadyInDesiredState(message))) => {
                tracing::debug!(mutation = mutation.name(), %entity, %message, "mutation.already_applied");
                let snapshot = pending.keep();
                let touched = snapshot.keys().cloned().collect();
                snapshot.discard();
                Ok(Settled {
                    outcome: Outcome::AlreadyApplied,
                    response: Value::Null,
                    touched,
                })
            }
            Ok(Err(err)) => {
                tracing::warn!(mutation = mutation.name(), %entity, error = %err, "mutation.rollback");
                pending.roll_back();
                Err(err.into())
            }
            Err(cancelled) => {
                tracing::debug!(mutation = mutation.name(), %entity, "mutation.cancelled");
                pending.roll_back();
                Err(cancelled)
            }
        }
    }

    /// Steps 1-3: predict, snapshot, write. Each entry is updated in one
    /// atomic read-modify-write, and the snapshot records exactly the value
    /// that write replaced.
    fn apply_optimistic(&self, mutation: &dyn Mutation) -> Snapshot {
        let store = self.store();
        let mut snapshot = Snapshot::new();
        for key in store.keys() {
            if !mutation.affects(&key) {
                continue;
            }
            let previous = store.update(&key, &mut |value| mutation.apply(&key, value));
            if let Some(previous) = previous {
                if let Some(value) = previous.value {
                    snapshot.capture(key, value);
                }
            }
        }
        snapshot
    }

    fn settle(&self, mutation: &dyn Mutation, snapshot: Snapshot, response: Value) -> Settled {
        let store = self.store();
        let touched: Vec<ResourceKey> = snapshot.keys().cloned().collect();
        snapshot.discard();

        let already = mutation.already_applied(&response);
        let mut reconciled = false;
        for key in store.keys() {
            if !mutation.affects(&key) {
                continue;
            }
            let replaced = store.update(&key, &mut |current| {
                mutation.reconcile(&key, current, &response)
            });
            reconciled |= replaced.is_some();
        }

        for key in mutation.invalidates(&response) {
            self.query.invalidate(&key);
        }

        let outcome = if already {
            Outcome::AlreadyApplied
        } else if reconciled {
            Outcome::Reconciled
        } else {
            Outcome::Confirmed
        };
        tracing::debug!(mutation = mutation.name(), ?outcome, "mutation.settled");
        Settled {
            outcome,
            response,
            touched,
        }
    }
}

/// Optimistic writes of one mutation that has not settled yet. Dropped
/// while still holding its snapshot, e.g. when the caller abandons the
/// future, it puts the snapshot back.
struct Pending<'a> {
    store: &'a dyn CacheStore,
    mutation: &'a dyn Mutation,
    snapshot: Option<Snapshot>,
}

impl Pending<'_> {
    fn len(&self) -> usize {
        self.snapshot.as_ref().map_or(0, Snapshot::len)
    }

    /// The optimistic values stand.
    fn keep(mut self) -> Snapshot {
        self.snapshot.take().unwrap_or_default()
    }

    fn roll_back(mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            restore(self.store, self.mutation, snapshot);
        }
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            tracing::debug!(mutation = self.mutation.name(), "mutation.abandoned");
            restore(self.store, self.mutation, snapshot);
        }
    }
}

fn restore(store: &dyn CacheStore, mutation: &dyn Mutation, snapshot: Snapshot) {
    for record in snapshot.into_records() {
        store.update(&record.key, &mut |current| {
            Some(mutation.restore(&record.key, current, &record.value))
        });
    }
}
