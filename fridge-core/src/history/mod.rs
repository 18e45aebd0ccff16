//! Scan history: an ordered list of past results, newest first.
//!
//! The whole list lives in one key-value slot ([`HISTORY_KEY`]) as a single
//! JSON array. It is read once by [`HistoryStore::load`] and rewritten in full
//! on every [`HistoryStore::append`].
//!
//! ## Known properties
//!
//! - No eviction, size cap or deduplication. The blob grows for as long as
//!   the backing medium keeps it.
//! - Two stores appending to the same slot concurrently race: the last
//!   write wins and the other append is lost. The store assumes a single
//!   scan in flight.
//! - History is non-critical state. A missing or corrupt blob loads as an
//!   empty store and write failures during `append` are logged, not raised.
//!   Callers that need to report them call [`HistoryStore::take_write_error`].

mod memory;
mod storage;

pub use memory::MemoryStorage;
pub use storage::FileStorage;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::StorageError;
use crate::model::{HistoryEntry, ScanResult};

/// Key of the history blob. Matches the browser app's local storage key.
pub const HISTORY_KEY: &str = "scanHistory";

/// A persisted key-value slot.
pub trait HistoryStorage: Send + Sync {
    /// Read the blob under `key`; `None` when the key was never written.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the blob under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory history backed by a [`HistoryStorage`] slot.
pub struct HistoryStore<S> {
    storage: S,
    entries: Vec<HistoryEntry>,
    write_error: Option<StorageError>,
}

impl<S: HistoryStorage> HistoryStore<S> {
    /// Load history from `storage`. Never fails: an unreadable, empty or
    /// malformed blob yields an empty store.
    pub fn load(storage: S) -> Self {
        let entries = match storage.read(HISTORY_KEY) {
            Ok(blob) => decode_blob(blob.as_deref()),
            Err(e) => {
                warn!(error = %e, "History unreadable, starting empty");
                Vec::new()
            }
        };

        info!(entries = entries.len(), "History loaded");
        Self {
            storage,
            entries,
            write_error: None,
        }
    }

    /// Record a scan result as the newest entry and persist the full list.
    ///
    /// Persistence is best effort; a failed write is logged and the entry
    /// still lives in memory. The failure is kept for
    /// [`take_write_error`](Self::take_write_error).
    pub fn append(&mut self, result: ScanResult) -> HistoryEntry {
        let entry = HistoryEntry::new(self.fresh_id(), Utc::now().timestamp_millis(), result);
        self.entries.insert(0, entry.clone());

        debug!(
            id = %entry.id,
            ingredients = entry.found_ingredients.len(),
            recipes = entry.recipes.len(),
            "Appended history entry"
        );

        self.write_error = self.flush().err();
        if let Some(e) = &self.write_error {
            warn!(error = %e, id = %entry.id, "Failed to persist history");
        }

        entry
    }

    /// All entries, newest first.
    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the full list to storage.
    pub fn flush(&self) -> Result<(), StorageError> {
        let blob = serde_json::to_string(&self.entries)?;
        self.storage.write(HISTORY_KEY, &blob)
    }

    /// Error from the most recent `append` write, if it failed. Cleared by
    /// the call and by the next successful append.
    pub fn take_write_error(&mut self) -> Option<StorageError> {
        self.write_error.take()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

fn decode_blob(blob: Option<&str>) -> Vec<HistoryEntry> {
    let Some(blob) = blob.filter(|b| !b.trim().is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str(blob) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, bytes = blob.len(), "History blob is corrupt, starting empty");
            Vec::new()
        }
    }
}
