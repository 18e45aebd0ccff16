//! File-backed key-value slot for the history blob.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::HistoryStorage;
use crate::error::StorageError;

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary file that is then renamed over the target, so a
/// crash mid-write leaves the previous blob intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl HistoryStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(blob) => {
                debug!(path = %path.display(), bytes = blob.len(), "Read history blob");
                Ok(Some(blob))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = value.len(), "Wrote history blob");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_key_reads_none() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        assert_eq!(storage.read("scanHistory").unwrap(), None);
    }

    #[test]
    fn test_write_creates_dir_and_overwrites() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join("nested").join("data"));

        storage.write("scanHistory", "[1]").unwrap();
        storage.write("scanHistory", "[2]").unwrap();

        assert_eq!(storage.read("scanHistory").unwrap().as_deref(), Some("[2]"));
        assert!(storage.path_for("scanHistory").exists());
        assert!(!storage
            .path_for("scanHistory")
            .with_extension("json.tmp")
            .exists());
    }

    #[test]
    fn test_keys_are_separate_files() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        storage.write("a", "1").unwrap();
        storage.write("b", "2").unwrap();
        assert_eq!(storage.read("a").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.read("b").unwrap().as_deref(), Some("2"));
    }
}
