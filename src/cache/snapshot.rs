use serde_json::Value;

use crate::key::ResourceKey;

/// One entry's value as it was before an optimistic write.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotRecord {
    pub key: ResourceKey,
    pub value: Value,
}

/// Pre-mutation copy of every cache entry a mutation touched.
///
/// Owned by exactly one in-flight mutation and consumed when it settles,
/// so nothing captured here can leak into a later rollback.
#[derive(Debug, Default)]
pub struct Snapshot {
    records: Vec<SnapshotRecord>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `value` as the pre-write copy of `key`.
    pub fn capture(&mut self, key: ResourceKey, value: Value) {
        self.records.push(SnapshotRecord { key, value });
    }

    /// Keys captured so far, in capture order.
    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.records.iter().map(|r| &r.key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop the snapshot after a successful settle.
    pub fn discard(self) {}

    /// The captured records, in capture order, for a rollback.
    pub fn into_records(self) -> Vec<SnapshotRecord> {
        self.records
    }
}
