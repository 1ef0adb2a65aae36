//! Collaborator traits for the two sides of a sync run.
//!
//! Implementations:
//! - `MemoryRepo` / `MemoryNotes` (in `memory`) - For testing
//! - `GitHubRepo` / `HedgeDocNotes` (in the `notebridge` binary crate) -
//!   HTTP clients
//!
//! The engine only ever talks to these traits; retry and backoff policy
//! belongs to the implementations, not to the engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metadata::NoteMeta;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// One entry in the note server's per-user view-history ledger.
///
/// Field names follow the wire format; `time` is unix milliseconds. Entries
/// are appended and never mutated or removed by this tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    /// The note title as shown on the server's dashboard.
    pub text: String,
    pub time: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub pinned: bool,
}

/// The file-tree side: a version-controlled repository holding one file per
/// document.
#[async_trait]
pub trait RepoClient: Send + Sync {
    /// List the paths of all documents in the repository.
    async fn list_documents(&self) -> Result<Vec<String>>;

    /// Read a document's full content.
    async fn read_document(&self, path: &str) -> Result<String>;

    /// Create or overwrite a document, recording `change_note` as the commit
    /// message.
    async fn write_document(&self, path: &str, content: &str, change_note: &str) -> Result<()>;
}

/// The note-server side: notes addressed by server-assigned ids.
#[async_trait]
pub trait NoteClient: Send + Sync {
    /// Create a note and return its server-assigned id.
    ///
    /// A freshly created note stays invisible to normal listing until a
    /// ledger entry exists for it, so creation must be followed by a ledger
    /// append (see `HistoryReconciler`).
    async fn create_document(&self, content: &str, meta: &NoteMeta) -> Result<String>;

    /// Read a note's full content.
    async fn read_document(&self, id: &str) -> Result<String>;

    /// Fetch the current view-history ledger.
    async fn get_ledger(&self) -> Result<Vec<HistoryEntry>>;

    /// Replace the ledger with the given full contents. The transport
    /// replaces wholesale even though the operation is conceptually additive.
    async fn append_ledger(&self, entries: &[HistoryEntry]) -> Result<()>;
}
