//! The per-run mapping log: which note id landed at which repository path.

use serde::{Deserialize, Serialize};

/// One synced document: the server-assigned note id paired with the
/// repository path it corresponds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMapping {
    pub remote_id: String,
    pub local_path: String,
}

/// Serialize mappings for the per-run log file.
///
/// Entries are written as an array of pairs in the order given; the executor
/// sorts them by local path first, so two runs over the same state produce
/// identical, diff-friendly logs.
pub fn to_log(mappings: &[SyncMapping]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(mappings)
}
