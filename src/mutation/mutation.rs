use serde_json::Value;

use crate::client::ApiRequest;
use crate::key::ResourceKey;

/// One user-triggered state change, described well enough for the
/// controller to predict it, send it, and undo it.
///
/// `apply` must be pure and must compute what the server is expected to
/// compute, otherwise reconciliation shows a flicker.
pub trait Mutation: Send + Sync {
    /// Short name used in logs (e.g. `"feed.like"`).
    fn name(&self) -> &'static str;

    /// Identity intents are serialized on. Two mutations with the same
    /// entity id never run concurrently.
    fn entity_id(&self) -> String;

    /// Whether entries under `key` may contain the entity.
    fn affects(&self, key: &ResourceKey) -> bool;

    /// The optimistic value for one affected entry, or `None` when the
    /// entry does not contain the entity or is already in the target state.
    fn apply(&self, key: &ResourceKey, value: &Value) -> Option<Value>;

    fn request(&self) -> ApiRequest;

    /// Value to put back after a failure. `snapshot` is the entry as it was
    /// before `apply`; `current` may carry other mutations' work since.
    fn restore(&self, _key: &ResourceKey, _current: &Value, snapshot: &Value) -> Value {
        snapshot.clone()
    }

    /// Server-authoritative replacement for one touched entry, if the
    /// response carries one.
    fn reconcile(&self, _key: &ResourceKey, _current: &Value, _response: &Value) -> Option<Value> {
        None
    }

    /// A reason when a successful status still reports that nothing was
    /// done (e.g. a `false` body). Treated as a failure and rolled back.
    fn rejected(&self, _response: &Value) -> Option<String> {
        None
    }

    /// Whether a successful response says the action was redundant.
    fn already_applied(&self, _response: &Value) -> bool {
        false
    }

    /// Entries to refetch in the background after success.
    fn invalidates(&self, _response: &Value) -> Vec<ResourceKey> {
        Vec::new()
    }
}

impl<M: Mutation + ?Sized> Mutation for Box<M> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn entity_id(&self) -> String {
        (**self).entity_id()
    }

    fn affects(&self, key: &ResourceKey) -> bool {
        (**self).affects(key)
    }

    fn apply(&self, key: &ResourceKey, value: &Value) -> Option<Value> {
        (**self).apply(key, value)
    }

    fn request(&self) -> ApiRequest {
        (**self).request()
    }

    fn restore(&self, key: &ResourceKey, current: &Value, snapshot: &Value) -> Value {
        (**self).restore(key, current, snapshot)
    }

    fn reconcile(&self, key: &ResourceKey, current: &Value, response: &Value) -> Option<Value> {
        (**self).reconcile(key, current, response)
    }

    fn rejected(&self, response: &Value) -> Option<String> {
        (**self).rejected(response)
    }

    fn already_applied(&self, response: &Value) -> bool {
        (**self).already_applied(response)
    }

    fn invalidates(&self, response: &Value) -> Vec<ResourceKey> {
        (**self).invalidates(response)
    }
}
