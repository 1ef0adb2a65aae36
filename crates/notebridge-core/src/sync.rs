//! One full synchronization pass: list, index, reconcile, execute.

use thiserror::Error;
use tracing::{Instrument, info, info_span};

use crate::client::{ClientError, NoteClient, RepoClient};
use crate::executor::{SyncExecutor, SyncReport};
use crate::index;
use crate::reconcile::Reconciler;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A side's listing call failed outright at the start of the run. An
    /// unreachable collaborator must not be mistaken for an empty one, or a
    /// network failure would look like "create everything on the other
    /// side".
    #[error("{side} listing unavailable: {source}")]
    SourceUnavailable {
        side: &'static str,
        #[source]
        source: ClientError,
    },
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Options for a sync pass.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// File names excluded from syncing, matched against the canonical name
    /// rather than the full path.
    pub ignore: Vec<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            ignore: vec!["README.md".to_string()],
        }
    }
}

/// Drives one reconciliation pass end to end.
pub struct SyncRun<'a> {
    repo: &'a dyn RepoClient,
    notes: &'a dyn NoteClient,
    options: SyncOptions,
}

impl<'a> SyncRun<'a> {
    pub fn new(repo: &'a dyn RepoClient, notes: &'a dyn NoteClient) -> Self {
        Self::with_options(repo, notes, SyncOptions::default())
    }

    pub fn with_options(
        repo: &'a dyn RepoClient,
        notes: &'a dyn NoteClient,
        options: SyncOptions,
    ) -> Self {
        Self { repo, notes, options }
    }

    /// List both sides, reconcile, and execute the resulting plan.
    pub async fn run(&self) -> Result<SyncReport> {
        self.run_inner().instrument(info_span!("sync")).await
    }

    async fn run_inner(&self) -> Result<SyncReport> {
        let paths = self
            .repo
            .list_documents()
            .await
            .map_err(|source| SyncError::SourceUnavailable { side: "repository", source })?;
        let ledger = self
            .notes
            .get_ledger()
            .await
            .map_err(|source| SyncError::SourceUnavailable { side: "note server", source })?;

        let kept = paths
            .into_iter()
            .filter(|path| !self.is_ignored(path))
            .collect::<Vec<_>>();
        let local = index::local_index(kept);
        let remote = index::remote_index(ledger.into_iter().map(|entry| (entry.text, entry.id)));
        info!(
            "Reconciling {} file(s) against {} note(s)",
            local.len(),
            remote.len()
        );

        let actions = Reconciler::new(self.repo, self.notes).plan(&local, &remote).await;
        if actions.is_empty() {
            info!("Everything in sync");
            return Ok(SyncReport::default());
        }

        info!("{} action(s) to apply", actions.len());
        Ok(SyncExecutor::new(self.repo, self.notes).execute(&actions).await)
    }

    fn is_ignored(&self, path: &str) -> bool {
        let name = index::canonical_name(path);
        self.options.ignore.iter().any(|ignored| ignored == name)
    }
}
