//! Document index construction.
//!
//! Both sides of a sync run are reduced to a deterministic ordering over a
//! canonical name so the reconciler can walk them in lock-step. Locally the
//! name is the final path segment; remotely it is the note title. Comparison
//! is plain byte ordering with no case, whitespace, or Unicode normalization
//! so that a run is reproducible for a given pair of listings.

/// A document on the file-tree side of the sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    /// Canonical name (final path segment).
    pub name: String,
    /// Full repository path.
    pub path: String,
}

/// A document on the note-server side of the sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Canonical name (note title).
    pub name: String,
    /// Server-assigned note id.
    pub id: String,
}

/// Canonical name of a repository path: its final `/`-separated segment.
pub fn canonical_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Build the local index, sorted ascending by canonical name.
///
/// Duplicate names are preserved: two paths sharing a file name are a caller
/// error that surfaces downstream rather than being hidden here.
pub fn local_index(paths: impl IntoIterator<Item = String>) -> Vec<LocalEntry> {
    let mut entries: Vec<LocalEntry> = paths
        .into_iter()
        .map(|path| LocalEntry {
            name: canonical_name(&path).to_string(),
            path,
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

/// Build the remote index from `(title, id)` pairs, sorted by title with the
/// id carried along.
pub fn remote_index(pairs: impl IntoIterator<Item = (String, String)>) -> Vec<RemoteEntry> {
    let mut entries: Vec<RemoteEntry> = pairs
        .into_iter()
        .map(|(name, id)| RemoteEntry { name, id })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}
