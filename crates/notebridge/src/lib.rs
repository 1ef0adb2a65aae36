//! notebridge binary internals: HTTP collaborators, config loading, and
//! mapping-log output.
//!
//! This is a thin library layer over the binary's components, allowing
//! tests to access internal types.

pub mod config;
pub mod github;
pub mod hedgedoc;
pub mod http;
pub mod logs;

pub use config::Credentials;
pub use github::GitHubRepo;
pub use hedgedoc::HedgeDocNotes;
