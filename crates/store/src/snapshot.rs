//! JSON snapshot files for the in-memory stores.

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use kairos_core::Result;

/// Load all records from a JSON array file. A missing file is an empty store.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = std::fs::read_to_string(path)?;
    let records: Vec<T> = serde_json::from_str(&data)?;
    Ok(records)
}

/// Save all records to a JSON array file, creating parent directories.
///
/// Writes to a sibling temp file first and renames it over the target, so a
/// crash mid-write leaves the previous snapshot intact.
pub fn save_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(records)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
