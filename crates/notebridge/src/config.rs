//! Credential file loading.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid credential file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Credentials for both collaborators, loaded from a JSON file.
///
/// The file holds secrets and lives outside the synced repository; only its
/// path is configurable.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub github_owner: String,
    pub github_repo: String,
    pub github_token: String,
    pub hedgedoc_email: String,
    pub hedgedoc_password: String,
}

impl Credentials {
    /// Load credentials from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}
