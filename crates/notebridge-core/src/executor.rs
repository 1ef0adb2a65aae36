//! Applies a reconciliation plan against the two collaborators.
//!
//! Failure policy: one document failing to fetch or write is logged and
//! skipped; the pass always runs to the end and there is no rollback. The
//! mapping log covers completed actions only and is assembled once, after
//! the pass, sorted by local path.

use chrono::Local;
use tracing::{error, info};

use crate::client::{NoteClient, RepoClient};
use crate::history::HistoryReconciler;
use crate::mapping::SyncMapping;
use crate::metadata;
use crate::reconcile::Action;

/// Outcome of one executed sync pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Notes created on the server.
    pub created_remote: usize,
    /// Files written in the repository.
    pub written_local: usize,
    /// Actions abandoned after a fetch or write failure.
    pub skipped: usize,
    /// Mapping entries for completed actions, sorted by local path.
    pub mappings: Vec<SyncMapping>,
}

pub struct SyncExecutor<'a> {
    repo: &'a dyn RepoClient,
    notes: &'a dyn NoteClient,
}

impl<'a> SyncExecutor<'a> {
    pub fn new(repo: &'a dyn RepoClient, notes: &'a dyn NoteClient) -> Self {
        Self { repo, notes }
    }

    /// Apply every action in order and return the report.
    ///
    /// Ledger entries for created notes are ensured in one batch after the
    /// action loop; without an entry a new note stays invisible to normal
    /// listing, so this step is part of creation, not an optional extra.
    pub async fn execute(&self, actions: &[Action]) -> SyncReport {
        let mut report = SyncReport::default();
        let mut created_ids = Vec::new();

        for action in actions {
            match action {
                Action::CreateRemote { name, path } => match self.create_remote(path).await {
                    Ok(id) => {
                        report.created_remote += 1;
                        report.mappings.push(SyncMapping {
                            remote_id: id.clone(),
                            local_path: path.clone(),
                        });
                        created_ids.push(id);
                    }
                    Err(e) => {
                        error!("Failed to create a note for {}: {}", name, e);
                        report.skipped += 1;
                    }
                },
                Action::WriteLocal { name, id, path } => {
                    let target = path.as_deref().unwrap_or(name);
                    self.apply_local_write(&mut report, name, id, target).await;
                }
                Action::OverwriteLocal { name, id, path } => {
                    self.apply_local_write(&mut report, name, id, path).await;
                }
            }
        }

        if !created_ids.is_empty() {
            if let Err(e) = HistoryReconciler::new(self.notes).ensure_present(&created_ids).await {
                error!("Failed to update the view-history ledger: {}", e);
            }
        }

        report.mappings.sort_by(|a, b| a.local_path.cmp(&b.local_path));
        info!(
            "Created {} note(s), wrote {} file(s), skipped {}",
            report.created_remote, report.written_local, report.skipped
        );
        report
    }

    async fn apply_local_write(&self, report: &mut SyncReport, name: &str, id: &str, target: &str) {
        match self.write_local(id, target).await {
            Ok(()) => {
                report.written_local += 1;
                report.mappings.push(SyncMapping {
                    remote_id: id.to_string(),
                    local_path: target.to_string(),
                });
            }
            Err(e) => {
                error!("Failed to sync note {} ({}): {}", id, name, e);
                report.skipped += 1;
            }
        }
    }

    async fn create_remote(&self, path: &str) -> crate::client::Result<String> {
        let content = self.repo.read_document(path).await?;
        let meta = metadata::extract(&content);
        let id = self.notes.create_document(&content, &meta).await?;
        info!("Created note {} for {}", id, path);
        Ok(id)
    }

    async fn write_local(&self, id: &str, target: &str) -> crate::client::Result<()> {
        let content = self.notes.read_document(id).await?;
        let change_note = format!(
            "last changed at {}",
            Local::now().format("%b %d, %Y %I:%M %p")
        );
        self.repo.write_document(target, &content, &change_note).await?;
        info!("Wrote note {} to {}", id, target);
        Ok(())
    }
}
