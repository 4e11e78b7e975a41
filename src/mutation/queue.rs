use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slots = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// Per-entity FIFO queue.
///
/// Each entity id gets one async mutex, created on first use and dropped
/// once nobody holds or waits for it. Waiters are served in the order they
/// arrived, so intents against one entity settle in issuance order.
#[derive(Default)]
pub struct MutationQueue {
    slots: Slots,
}

/// Exclusive turn for one entity. Released on drop.
pub struct QueueSlot {
    id: String,
    slots: Slots,
    guard: Option<OwnedMutexGuard<()>>,
}

impl MutationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the entity's turn.
    pub async fn acquire(&self, id: &str) -> QueueSlot {
        let slot = self.ensure_slot(id);
        let guard = slot.lock_owned().await;
        QueueSlot {
            id: id.to_string(),
            slots: self.slots.clone(),
            guard: Some(guard),
        }
    }

    /// Whether any intent for the entity is running or waiting.
    pub fn is_busy(&self, id: &str) -> bool {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .get(id)
            .is_some_and(|slot| Arc::strong_count(slot) > 1)
    }

    /// Entities with a queued or running intent.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_slot(&self, id: &str) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

impl QueueSlot {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for QueueSlot {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // Map + this guard are the only holders: nobody is waiting.
        let idle = slots
            .get(&self.id)
            .is_some_and(|slot| Arc::strong_count(slot) <= 2);
        if idle {
            slots.remove(&self.id);
        }
        self.guard.take();
    }
}
