//! Common utility functions shared across CLI commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use directories::ProjectDirs;
use fridge_core::{FileStorage, HistoryStore};
use tracing::debug;

/// Environment variable overriding the history directory.
pub const DATA_DIR_ENV: &str = "FRIDGE_DATA_DIR";

/// Pick the history directory: flag, then `FRIDGE_DATA_DIR`, then the
/// platform data directory.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }

    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    let dirs = ProjectDirs::from("", "", "fridgeai")
        .context("Could not determine a data directory; pass --data-dir")?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Open the history kept under `data_dir`.
pub fn open_history(data_dir: PathBuf) -> HistoryStore<FileStorage> {
    debug!(dir = %data_dir.display(), "Opening history");
    HistoryStore::load(FileStorage::new(data_dir))
}

/// Format a Unix timestamp (milliseconds) as local date and time.
pub fn format_timestamp(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        _ => format!("{timestamp_ms}ms"),
    }
}

/// First eight characters of an id, enough to pick it back out.
pub fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(i, _)| &id[..i])
}
