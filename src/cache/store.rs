// Cache store for reading and writing the fetch record.
// Handles JSON serialization, corrupt-file fallback, and atomic writes.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::luogu::{TierCounts, to_tiers};

/// Last-known statistics and the time each category was fetched.
///
/// Field names match the JSON layout of existing cache files; every field
/// is optional on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// When personal statistics were last fetched (epoch seconds).
    #[serde(default)]
    pub last_update_time: f64,
    /// Passed problems per difficulty tier.
    #[serde(default)]
    pub personal_passed: Vec<u32>,
    /// Attempted but unpassed problems.
    #[serde(default)]
    pub personal_unpassed: u32,
    /// Problem count per difficulty tier across the whole site.
    #[serde(default)]
    pub total_counts: Vec<u32>,
    /// When the tier totals were last fetched (epoch seconds).
    #[serde(default)]
    pub total_last_time: f64,
}

impl CacheRecord {
    pub fn passed(&self) -> TierCounts {
        to_tiers(&self.personal_passed)
    }

    pub fn totals(&self) -> TierCounts {
        to_tiers(&self.total_counts)
    }
}

/// Read the cache record from a file.
///
/// A missing or blank file yields `None`.
pub fn read_record(path: &Path) -> Result<Option<CacheRecord>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(None);
    }

    let record: CacheRecord = serde_json::from_str(&contents)?;
    Ok(Some(record))
}

/// Load the cache record, falling back to an empty one if it is unreadable.
pub fn load(path: &Path) -> CacheRecord {
    match read_record(path) {
        Ok(Some(record)) => record,
        Ok(None) => CacheRecord::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cache file unreadable, starting empty");
            CacheRecord::default()
        }
    }
}

/// Write the cache record as pretty JSON.
pub fn write_record(path: &Path, record: &CacheRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    write_bytes(path, json.as_bytes())
}

/// Write text atomically.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    write_bytes(path, text.as_bytes())
}

/// Write bytes atomically via a sibling temp file.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);

    let mut file = fs::File::create(temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(temp_path, path)?;

    Ok(())
}
