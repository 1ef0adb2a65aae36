//! notebridge-core: the reconciliation engine between a git-hosted document
//! tree and a HedgeDoc-style note server.
//!
//! This crate provides the core functionality for:
//! - Parsing document headers (title, tags)
//! - Building comparable document indexes for both sides
//! - Classifying every document into a sync action (two-pointer merge-join)
//! - Executing actions and producing the id-to-path mapping log
//! - Keeping the server's view-history ledger free of duplicates
//!
//! Transport lives elsewhere: collaborators are reached through the
//! `RepoClient` and `NoteClient` traits, with HTTP implementations in the
//! `notebridge` binary crate and in-memory implementations here for tests.

pub mod client;
pub mod executor;
pub mod history;
pub mod index;
pub mod mapping;
pub mod memory;
pub mod metadata;
pub mod reconcile;
pub mod sync;

pub use client::{ClientError, HistoryEntry, NoteClient, RepoClient};
pub use executor::{SyncExecutor, SyncReport};
pub use history::HistoryReconciler;
pub use index::{LocalEntry, RemoteEntry};
pub use mapping::SyncMapping;
pub use memory::{MemoryNotes, MemoryRepo};
pub use metadata::NoteMeta;
pub use reconcile::{Action, Reconciler};
pub use sync::{SyncError, SyncOptions, SyncRun};
