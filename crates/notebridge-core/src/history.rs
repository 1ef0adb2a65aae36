//! Keeps the view-history ledger consistent with the notes that exist.
//!
//! The server only lists a note on its dashboard once the note has a ledger
//! entry, so every created note needs one. Entries must not be duplicated:
//! the ledger is read once, missing ids are collected, and a single append
//! carries them all.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::client::{HistoryEntry, NoteClient, Result};
use crate::metadata;

pub struct HistoryReconciler<'a> {
    notes: &'a dyn NoteClient,
}

impl<'a> HistoryReconciler<'a> {
    pub fn new(notes: &'a dyn NoteClient) -> Self {
        Self { notes }
    }

    /// Ensure every id appears in the ledger exactly once.
    ///
    /// Ids already present are logged no-ops. For each missing id the note
    /// content is read to recover its title and tags, and all new entries go
    /// out in one `append_ledger` call. The read and the append are separate
    /// requests, so concurrent writers can still race this into a duplicate;
    /// a single sequential run cannot.
    pub async fn ensure_present(&self, ids: &[String]) -> Result<()> {
        let mut ledger = self.notes.get_ledger().await?;
        let mut present: HashSet<String> = ledger.iter().map(|e| e.id.clone()).collect();

        let mut added = 0;
        for id in ids {
            if present.contains(id) {
                debug!("Note {} already in the ledger", id);
                continue;
            }
            let meta = match self.notes.read_document(id).await {
                Ok(content) => metadata::extract(&content),
                Err(e) => {
                    warn!("Skipping ledger entry for note {}: {}", id, e);
                    continue;
                }
            };
            ledger.push(HistoryEntry {
                id: id.clone(),
                text: meta.title_or_empty().to_string(),
                time: Utc::now().timestamp_millis(),
                tags: meta.tags,
                pinned: false,
            });
            present.insert(id.clone());
            added += 1;
        }

        if added == 0 {
            return Ok(());
        }
        self.notes.append_ledger(&ledger).await?;
        info!("Added {} note(s) to the ledger", added);
        Ok(())
    }
}
