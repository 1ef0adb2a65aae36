//! Per-run mapping log files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use notebridge_core::mapping::{self, SyncMapping};

/// Write the mapping log for one run to `<dir>/note_sync_<YYYYMMDD>.json`.
///
/// The entries arrive already sorted by local path, so re-running a sync on
/// the same day overwrites the file with identical content.
pub fn write_mapping_log(dir: &Path, mappings: &[SyncMapping]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let file = dir.join(format!("note_sync_{}.json", Local::now().format("%Y%m%d")));
    let log = mapping::to_log(mappings)?;
    fs::write(&file, log).with_context(|| format!("Failed to write {}", file.display()))?;
    Ok(file)
}
