//! In-memory key-value slot, for tests and throwaway sessions.

use std::sync::Arc;

use dashmap::DashMap;

use super::HistoryStorage;
use crate::error::StorageError;

/// In-memory storage. Clones share the same slots, so a second store opened
/// on a clone sees what the first one flushed.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<DashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one blob.
    pub fn with_blob(key: &str, blob: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.slots.insert(key.to_string(), blob.into());
        storage
    }

    /// Raw blob currently held under `key`.
    pub fn blob(&self, key: &str) -> Option<String> {
        self.slots.get(key).map(|v| v.value().clone())
    }
}

impl HistoryStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.blob(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
