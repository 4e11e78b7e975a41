use std::time::SystemTime;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Loading metadata carried next to the last known-good value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EntryStatus {
    #[default]
    Idle,
    Loading,
    Error(String),
}

/// The last known-good value for one resource key.
///
/// Created on the first read request (usually as `Loading` with no value),
/// then replaced wholesale by fetches and optimistic writes. `version` goes
/// up by one on every replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub value: Option<Value>,
    pub status: EntryStatus,
    pub fetched_at: Option<SystemTime>,
    pub version: u64,
    pub stale: bool,
}

impl CacheEntry {
    pub(crate) fn pending() -> Self {
        Self {
            value: None,
            status: EntryStatus::Loading,
            fetched_at: None,
            version: 0,
            stale: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == EntryStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            EntryStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Decode the cached value into a typed view model.
    pub fn decode<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.value
            .as_ref()
            .map(|value| serde_json::from_value(value.clone()))
    }
}
