//! End-to-end tests for the reconciliation engine.
//!
//! Drives full sync passes through the public API against the in-memory
//! collaborators: listing, indexing, classification, execution, and the
//! ledger bookkeeping, with no transport involved.

use notebridge_core::client::{HistoryEntry, NoteClient, RepoClient};
use notebridge_core::memory::{MemoryNotes, MemoryRepo};
use notebridge_core::sync::{SyncOptions, SyncRun};

fn ledger_entry(id: &str, title: &str) -> HistoryEntry {
    HistoryEntry {
        id: id.into(),
        text: title.into(),
        time: 1,
        tags: vec![],
        pinned: false,
    }
}

/// A fresh repository against an empty server: everything is pushed up,
/// every created note lands in the ledger, and the mapping covers all files.
#[tokio::test]
async fn test_initial_push_of_a_whole_repository() {
    let repo = MemoryRepo::with_files([
        ("journal/day-one.md", "---\ntitle: day-one.md\ntags: [journal]\n---\nFirst entry."),
        ("ideas.md", "---\ntitle: ideas.md\n---\nLoose thoughts."),
        ("README.md", "Not a note."),
    ]);
    let notes = MemoryNotes::new();

    let report = SyncRun::new(&repo, &notes).run().await.unwrap();

    assert_eq!(report.created_remote, 2);
    assert_eq!(report.written_local, 0);
    assert_eq!(report.skipped, 0);

    // Mapping sorted by path, README excluded.
    let paths: Vec<&str> = report.mappings.iter().map(|m| m.local_path.as_str()).collect();
    assert_eq!(paths, vec!["ideas.md", "journal/day-one.md"]);

    // Every created note is visible: one ledger entry each, one append.
    let ledger = notes.ledger_snapshot();
    assert_eq!(ledger.len(), 2);
    assert_eq!(notes.append_calls(), 1);
    assert!(ledger.iter().any(|e| e.text == "day-one.md" && e.tags == vec!["journal"]));
    assert!(ledger.iter().all(|e| !e.pinned));
}

/// A populated server against an empty repository: everything is pulled
/// down, files named by note title.
#[tokio::test]
async fn test_initial_pull_into_an_empty_repository() {
    let repo = MemoryRepo::new();
    let notes = MemoryNotes::new();
    notes.insert("id-a", "Alpha body");
    notes.insert("id-b", "Beta body");
    notes.push_ledger(ledger_entry("id-a", "alpha.md"));
    notes.push_ledger(ledger_entry("id-b", "beta.md"));

    let report = SyncRun::new(&repo, &notes).run().await.unwrap();

    assert_eq!(report.written_local, 2);
    assert_eq!(repo.get("alpha.md").as_deref(), Some("Alpha body"));
    assert_eq!(repo.get("beta.md").as_deref(), Some("Beta body"));
}

/// Drift on a matched pair: the note's content replaces the file's, at the
/// file's real (nested) path.
#[tokio::test]
async fn test_remote_content_wins_on_matched_pair() {
    let repo = MemoryRepo::with_files([("docs/guide.md", "stale")]);
    let notes = MemoryNotes::new();
    notes.insert("id-g", "fresh");
    notes.push_ledger(ledger_entry("id-g", "guide.md"));

    let report = SyncRun::new(&repo, &notes).run().await.unwrap();

    assert_eq!(report.written_local, 1);
    assert_eq!(repo.get("docs/guide.md").as_deref(), Some("fresh"));
    // The original file was overwritten in place, not duplicated at the
    // title path.
    assert_eq!(repo.get("guide.md"), None);
}

/// One broken document must not poison the rest of the run.
#[tokio::test]
async fn test_partial_failure_leaves_the_rest_synced() {
    let repo = MemoryRepo::with_files([("good.md", "G"), ("bad.md", "B")]);
    repo.break_path("bad.md");
    let notes = MemoryNotes::new();

    let report = SyncRun::new(&repo, &notes).run().await.unwrap();

    assert_eq!(report.created_remote, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.mappings.len(), 1);
    assert_eq!(report.mappings[0].local_path, "good.md");
}

/// Two passes over a converged state stay converged, and the second pass
/// performs no ledger traffic at all.
#[tokio::test]
async fn test_convergence_is_stable() {
    let repo = MemoryRepo::with_files([(
        "notes/alpha.md",
        "---\ntitle: alpha.md\ntags: [a]\n---\nbody",
    )]);
    let notes = MemoryNotes::new();

    SyncRun::new(&repo, &notes).run().await.unwrap();
    let appends_after_first = notes.append_calls();

    let second = SyncRun::new(&repo, &notes).run().await.unwrap();

    assert_eq!(second.created_remote + second.written_local + second.skipped, 0);
    assert_eq!(notes.append_calls(), appends_after_first);
    assert_eq!(notes.ledger_snapshot().len(), 1);
}

/// A custom ignore set replaces the default one.
#[tokio::test]
async fn test_custom_ignore_set() {
    let repo = MemoryRepo::with_files([("README.md", "readme"), ("draft.md", "D")]);
    let notes = MemoryNotes::new();
    let options = SyncOptions { ignore: vec!["draft.md".to_string()] };

    let report = SyncRun::with_options(&repo, &notes, options).run().await.unwrap();

    // README.md is synced now; draft.md is not.
    assert_eq!(report.created_remote, 1);
    assert_eq!(report.mappings[0].local_path, "README.md");
}

/// The collaborators are only reached through their traits; a trait object
/// works as well as a concrete type.
#[tokio::test]
async fn test_runs_against_trait_objects() {
    let repo = MemoryRepo::with_files([("alpha.md", "A")]);
    let notes = MemoryNotes::new();
    let repo_dyn: &dyn RepoClient = &repo;
    let notes_dyn: &dyn NoteClient = &notes;

    let report = SyncRun::new(repo_dyn, notes_dyn).run().await.unwrap();
    assert_eq!(report.created_remote, 1);
}
