//! The reconciliation engine: a two-pointer merge-join over the two sorted
//! document indexes.
//!
//! Both indexes ascend by canonical name, so one lock-step pass classifies
//! every position:
//!
//! 1. Local name sorts before the remote cursor: the document exists only in
//!    the repository. Emit a remote creation and advance the local cursor.
//! 2. Otherwise both sides are fetched. If the remote name sorts first, or
//!    the two tag lists disagree, the note wins: emit a local write and
//!    advance the remote cursor.
//! 3. Names match and tags agree: emit a local overwrite if the contents
//!    differ, nothing if they match, and advance both cursors.
//!
//! Tags are checked before content, so a tag mismatch forces a write even
//! when the content agrees; the server is the authoritative side for both.
//! At least one cursor strictly advances per iteration, so the join
//! terminates within `local.len() + remote.len()` steps. Whatever either
//! side has left when the other runs out becomes a creation on the opposite
//! side.

use tracing::{debug, warn};

use crate::client::{NoteClient, RepoClient};
use crate::index::{LocalEntry, RemoteEntry};
use crate::metadata;

/// One unit of work emitted by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The document exists only in the repository: create a note for it.
    CreateRemote { name: String, path: String },
    /// The note has no repository counterpart, or its tags drifted on a
    /// matched pair: write it into the repository. `path` is the matched
    /// file when one exists; otherwise the note title names a new file.
    WriteLocal {
        name: String,
        id: String,
        path: Option<String>,
    },
    /// Contents diverged on a matched pair: the note wins.
    OverwriteLocal {
        name: String,
        id: String,
        path: String,
    },
}

/// Walks the two indexes and classifies every document into an action.
/// Content and tags are fetched lazily, only for positions where the names
/// align closely enough to need a comparison.
pub struct Reconciler<'a> {
    repo: &'a dyn RepoClient,
    notes: &'a dyn NoteClient,
}

impl<'a> Reconciler<'a> {
    pub fn new(repo: &'a dyn RepoClient, notes: &'a dyn NoteClient) -> Self {
        Self { repo, notes }
    }

    /// Produce the action list for one sync pass.
    ///
    /// A failed content fetch skips the affected document (the cursor on
    /// that side still advances) and the pass continues, so one unreachable
    /// document cannot take down the run.
    pub async fn plan(&self, local: &[LocalEntry], remote: &[RemoteEntry]) -> Vec<Action> {
        let mut actions = Vec::new();
        let mut i = 0;
        let mut j = 0;

        while i < local.len() && j < remote.len() {
            let l = &local[i];
            let r = &remote[j];

            // Nothing on the server sorts at or before this name.
            if l.name < r.name {
                actions.push(Action::CreateRemote {
                    name: l.name.clone(),
                    path: l.path.clone(),
                });
                i += 1;
                continue;
            }

            let remote_content = match self.notes.read_document(&r.id).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping note {} ({}): {}", r.id, r.name, e);
                    j += 1;
                    continue;
                }
            };
            let local_content = match self.repo.read_document(&l.path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping file {}: {}", l.path, e);
                    i += 1;
                    continue;
                }
            };
            let remote_tags = metadata::extract(&remote_content).tags;
            let local_tags = metadata::extract(&local_content).tags;

            // Remote-only, or tag drift on a matched name: the note wins.
            // Matched names carry the existing file path along so the write
            // lands on the file it was compared against.
            if r.name < l.name || remote_tags != local_tags {
                let path = (r.name == l.name).then(|| l.path.clone());
                actions.push(Action::WriteLocal {
                    name: r.name.clone(),
                    id: r.id.clone(),
                    path,
                });
                j += 1;
                continue;
            }

            if remote_content != local_content {
                actions.push(Action::OverwriteLocal {
                    name: r.name.clone(),
                    id: r.id.clone(),
                    path: l.path.clone(),
                });
            } else {
                debug!("{} is in sync", l.name);
            }
            i += 1;
            j += 1;
        }

        // Drain the tails: whatever one side has left, the other never saw.
        for l in &local[i..] {
            actions.push(Action::CreateRemote {
                name: l.name.clone(),
                path: l.path.clone(),
            });
        }
        for r in &remote[j..] {
            actions.push(Action::WriteLocal {
                name: r.name.clone(),
                id: r.id.clone(),
                path: None,
            });
        }

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{local_index, remote_index};
    use crate::memory::{MemoryNotes, MemoryRepo};

    fn locals(paths: &[&str]) -> Vec<LocalEntry> {
        local_index(paths.iter().map(|p| p.to_string()))
    }

    fn remotes(pairs: &[(&str, &str)]) -> Vec<RemoteEntry> {
        remote_index(pairs.iter().map(|(t, i)| (t.to_string(), i.to_string())))
    }

    #[tokio::test]
    async fn test_all_local_creates_remote_in_order() {
        let repo = MemoryRepo::with_files([("alpha.md", "A"), ("beta.md", "B")]);
        let notes = MemoryNotes::new();

        let actions = Reconciler::new(&repo, &notes)
            .plan(&locals(&["alpha.md", "beta.md"]), &[])
            .await;

        assert_eq!(
            actions,
            vec![
                Action::CreateRemote { name: "alpha.md".into(), path: "alpha.md".into() },
                Action::CreateRemote { name: "beta.md".into(), path: "beta.md".into() },
            ]
        );
    }

    #[tokio::test]
    async fn test_matched_equal_content_is_noop() {
        let repo = MemoryRepo::with_files([("alpha.md", "X")]);
        let notes = MemoryNotes::new();
        notes.insert("id1", "X");

        let actions = Reconciler::new(&repo, &notes)
            .plan(&locals(&["alpha.md"]), &remotes(&[("alpha.md", "id1")]))
            .await;

        assert!(actions.is_empty());
    }

    #[tokio::test]
    async fn test_content_drift_overwrites_local() {
        let repo = MemoryRepo::with_files([("alpha.md", "X")]);
        let notes = MemoryNotes::new();
        notes.insert("id1", "Y");

        let actions = Reconciler::new(&repo, &notes)
            .plan(&locals(&["alpha.md"]), &remotes(&[("alpha.md", "id1")]))
            .await;

        assert_eq!(
            actions,
            vec![Action::OverwriteLocal {
                name: "alpha.md".into(),
                id: "id1".into(),
                path: "alpha.md".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_tag_drift_wins_over_content_check() {
        // Same body, different tags. The tag comparison runs first and
        // forces a write, classified as WriteLocal rather than
        // OverwriteLocal.
        let repo = MemoryRepo::with_files([("alpha.md", "---\ntags: [a]\n---\nbody")]);
        let notes = MemoryNotes::new();
        notes.insert("id1", "---\ntags: [a, b]\n---\nbody");

        let actions = Reconciler::new(&repo, &notes)
            .plan(&locals(&["alpha.md"]), &remotes(&[("alpha.md", "id1")]))
            .await;

        assert_eq!(
            actions,
            vec![Action::WriteLocal {
                name: "alpha.md".into(),
                id: "id1".into(),
                path: Some("alpha.md".into()),
            }]
        );
    }

    #[tokio::test]
    async fn test_empty_local_all_remote_become_local_writes() {
        let repo = MemoryRepo::new();
        let notes = MemoryNotes::new();
        notes.insert("id1", "A");
        notes.insert("id2", "B");

        let actions = Reconciler::new(&repo, &notes)
            .plan(&[], &remotes(&[("alpha.md", "id1"), ("beta.md", "id2")]))
            .await;

        assert_eq!(
            actions,
            vec![
                Action::WriteLocal { name: "alpha.md".into(), id: "id1".into(), path: None },
                Action::WriteLocal { name: "beta.md".into(), id: "id2".into(), path: None },
            ]
        );
    }

    #[tokio::test]
    async fn test_disjoint_sets_degenerate_to_two_creation_passes() {
        let repo = MemoryRepo::with_files([("alpha.md", "A")]);
        let notes = MemoryNotes::new();
        notes.insert("id1", "Z");

        let actions = Reconciler::new(&repo, &notes)
            .plan(&locals(&["alpha.md"]), &remotes(&[("zeta.md", "id1")]))
            .await;

        assert_eq!(
            actions,
            vec![
                Action::CreateRemote { name: "alpha.md".into(), path: "alpha.md".into() },
                Action::WriteLocal { name: "zeta.md".into(), id: "id1".into(), path: None },
            ]
        );
    }

    #[tokio::test]
    async fn test_every_name_classified_exactly_once() {
        // Interleaved names across both sides; each produces one action (or
        // one no-op) and never more.
        let repo = MemoryRepo::with_files([("a.md", "A"), ("c.md", "C"), ("e.md", "E")]);
        let notes = MemoryNotes::new();
        notes.insert("id-b", "B");
        notes.insert("id-c", "C");
        notes.insert("id-d", "D");

        let actions = Reconciler::new(&repo, &notes)
            .plan(
                &locals(&["a.md", "c.md", "e.md"]),
                &remotes(&[("b.md", "id-b"), ("c.md", "id-c"), ("d.md", "id-d")]),
            )
            .await;

        // a: local-only, b: remote-only, c: matched+equal (no-op),
        // d: remote-only, e: local-only.
        assert_eq!(actions.len(), 4);
        let names: Vec<&str> = actions
            .iter()
            .map(|a| match a {
                Action::CreateRemote { name, .. }
                | Action::WriteLocal { name, .. }
                | Action::OverwriteLocal { name, .. } => name.as_str(),
            })
            .collect();
        assert_eq!(names, vec!["a.md", "b.md", "d.md", "e.md"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_document_and_continues() {
        let repo = MemoryRepo::with_files([("alpha.md", "X"), ("beta.md", "B")]);
        let notes = MemoryNotes::new();
        notes.insert("id1", "X");
        notes.insert("id2", "changed");
        notes.break_note("id1");

        let actions = Reconciler::new(&repo, &notes)
            .plan(
                &locals(&["alpha.md", "beta.md"]),
                &remotes(&[("alpha.md", "id1"), ("beta.md", "id2")]),
            )
            .await;

        // id1 is skipped; alpha.md then has no remote partner left at its
        // position and the pass still classifies beta.md.
        assert!(actions.iter().any(|a| matches!(
            a,
            Action::OverwriteLocal { id, .. } if id == "id2"
        )));
        assert!(!actions.iter().any(|a| matches!(
            a,
            Action::WriteLocal { id, .. } | Action::OverwriteLocal { id, .. } if id == "id1"
        )));
    }

    #[tokio::test]
    async fn test_duplicate_local_names_surface_downstream() {
        // Two files with the same canonical name: the first matches the
        // note, the second falls through as a spurious creation. The index
        // keeps duplicates on purpose so this is visible.
        let repo = MemoryRepo::with_files([("a/note.md", "X"), ("b/note.md", "X")]);
        let notes = MemoryNotes::new();
        notes.insert("id1", "X");

        let actions = Reconciler::new(&repo, &notes)
            .plan(
                &locals(&["a/note.md", "b/note.md"]),
                &remotes(&[("note.md", "id1")]),
            )
            .await;

        assert_eq!(
            actions,
            vec![Action::CreateRemote { name: "note.md".into(), path: "b/note.md".into() }]
        );
    }
}
