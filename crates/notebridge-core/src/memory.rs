//! In-memory collaborators for testing.
//!
//! `MemoryRepo` and `MemoryNotes` implement the client traits over plain
//! maps, with switches to make individual documents (or the listing calls
//! themselves) fail so the skip-and-continue paths can be exercised.

use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::client::{ClientError, HistoryEntry, NoteClient, RepoClient, Result};
use crate::metadata::NoteMeta;

/// In-memory `RepoClient`.
#[derive(Default)]
pub struct MemoryRepo {
    files: RwLock<BTreeMap<String, String>>,
    broken_paths: RwLock<HashSet<String>>,
    listing_broken: AtomicBool,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository pre-populated with files.
    pub fn with_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<String>,
        C: Into<String>,
    {
        let repo = Self::new();
        for (path, content) in files {
            repo.insert(path, content);
        }
        repo
    }

    pub fn insert(&self, path: impl Into<String>, content: impl Into<String>) {
        self.files.write().unwrap().insert(path.into(), content.into());
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.files.read().unwrap().get(path).cloned()
    }

    /// Make every read and write of `path` fail.
    pub fn break_path(&self, path: &str) {
        self.broken_paths.write().unwrap().insert(path.to_string());
    }

    /// Make `list_documents` fail, simulating an unreachable repository.
    pub fn break_listing(&self) {
        self.listing_broken.store(true, Ordering::SeqCst);
    }

    fn check_path(&self, path: &str) -> Result<()> {
        if self.broken_paths.read().unwrap().contains(path) {
            return Err(ClientError::Fetch(format!("{path} is unreachable")));
        }
        Ok(())
    }
}

#[async_trait]
impl RepoClient for MemoryRepo {
    async fn list_documents(&self) -> Result<Vec<String>> {
        if self.listing_broken.load(Ordering::SeqCst) {
            return Err(ClientError::Fetch("repository listing is unreachable".into()));
        }
        Ok(self.files.read().unwrap().keys().cloned().collect())
    }

    async fn read_document(&self, path: &str) -> Result<String> {
        self.check_path(path)?;
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(path.to_string()))
    }

    async fn write_document(&self, path: &str, content: &str, _change_note: &str) -> Result<()> {
        self.check_path(path)
            .map_err(|_| ClientError::Write(format!("{path} is unreachable")))?;
        self.insert(path, content);
        Ok(())
    }
}

/// In-memory `NoteClient`. Created notes receive sequential ids
/// (`note-1`, `note-2`, ...).
#[derive(Default)]
pub struct MemoryNotes {
    notes: RwLock<BTreeMap<String, String>>,
    ledger: RwLock<Vec<HistoryEntry>>,
    broken_ids: RwLock<HashSet<String>>,
    ledger_broken: AtomicBool,
    next_id: AtomicUsize,
    append_calls: AtomicUsize,
}

impl MemoryNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a note under a fixed id without touching the ledger, to
    /// fabricate server state for tests.
    pub fn insert(&self, id: impl Into<String>, content: impl Into<String>) {
        self.notes.write().unwrap().insert(id.into(), content.into());
    }

    pub fn note(&self, id: &str) -> Option<String> {
        self.notes.read().unwrap().get(id).cloned()
    }

    pub fn push_ledger(&self, entry: HistoryEntry) {
        self.ledger.write().unwrap().push(entry);
    }

    pub fn ledger_snapshot(&self) -> Vec<HistoryEntry> {
        self.ledger.read().unwrap().clone()
    }

    /// Number of `append_ledger` calls received so far.
    pub fn append_calls(&self) -> usize {
        self.append_calls.load(Ordering::SeqCst)
    }

    /// Make every read of note `id` fail.
    pub fn break_note(&self, id: &str) {
        self.broken_ids.write().unwrap().insert(id.to_string());
    }

    /// Make `get_ledger` fail, simulating an unreachable server.
    pub fn break_ledger(&self) {
        self.ledger_broken.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl NoteClient for MemoryNotes {
    async fn create_document(&self, content: &str, _meta: &NoteMeta) -> Result<String> {
        let id = format!("note-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.notes.write().unwrap().insert(id.clone(), content.to_string());
        Ok(id)
    }

    async fn read_document(&self, id: &str) -> Result<String> {
        if self.broken_ids.read().unwrap().contains(id) {
            return Err(ClientError::Fetch(format!("note {id} is unreachable")));
        }
        self.notes
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(id.to_string()))
    }

    async fn get_ledger(&self) -> Result<Vec<HistoryEntry>> {
        if self.ledger_broken.load(Ordering::SeqCst) {
            return Err(ClientError::Fetch("ledger is unreachable".into()));
        }
        Ok(self.ledger_snapshot())
    }

    async fn append_ledger(&self, entries: &[HistoryEntry]) -> Result<()> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        *self.ledger.write().unwrap() = entries.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_repo_basic_operations() {
        let repo = MemoryRepo::with_files([("alpha.md", "A")]);

        assert_eq!(repo.list_documents().await.unwrap(), vec!["alpha.md"]);
        assert_eq!(repo.read_document("alpha.md").await.unwrap(), "A");

        repo.write_document("beta.md", "B", "msg").await.unwrap();
        assert_eq!(repo.get("beta.md").as_deref(), Some("B"));

        assert!(matches!(
            repo.read_document("missing.md").await,
            Err(ClientError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_repo_broken_path() {
        let repo = MemoryRepo::with_files([("alpha.md", "A")]);
        repo.break_path("alpha.md");

        assert!(repo.read_document("alpha.md").await.is_err());
        assert!(repo.write_document("alpha.md", "X", "msg").await.is_err());
    }

    #[tokio::test]
    async fn test_memory_notes_create_assigns_ids() {
        let notes = MemoryNotes::new();
        let first = notes.create_document("one", &NoteMeta::default()).await.unwrap();
        let second = notes.create_document("two", &NoteMeta::default()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(notes.note(&first).as_deref(), Some("one"));
        assert_eq!(notes.note(&second).as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_memory_notes_ledger_replacement() {
        let notes = MemoryNotes::new();
        let entry = HistoryEntry {
            id: "id1".into(),
            text: "alpha.md".into(),
            time: 1,
            tags: vec![],
            pinned: false,
        };

        notes.append_ledger(std::slice::from_ref(&entry)).await.unwrap();
        assert_eq!(notes.get_ledger().await.unwrap(), vec![entry]);
        assert_eq!(notes.append_calls(), 1);
    }
}
