//! HedgeDoc implementation of `NoteClient`.
//!
//! Authentication is a form login that sets a session cookie; everything
//! after rides on the cookie store. Note creation posts raw markdown to
//! `/new` and the server answers with a redirect to the fresh note, so the
//! id is the final segment of the response URL. The view-history ledger is
//! read as JSON and written back wholesale as a form-encoded `history`
//! field.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use notebridge_core::client::{ClientError, HistoryEntry, NoteClient};
use notebridge_core::metadata::NoteMeta;

use crate::http::send_with_retry;

pub struct HedgeDocNotes {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct LedgerResponse {
    history: Vec<HistoryEntry>,
}

/// A note's id is the final path segment of its URL.
fn note_id_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

impl HedgeDocNotes {
    /// Connect to a HedgeDoc server and log in, establishing the session
    /// cookie every later call relies on.
    pub async fn login(endpoint: &str, email: &str, password: &str) -> Result<Self> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        let notes = Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        };

        notes
            .client
            .post(notes.url("login"))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("Login to {} failed", notes.endpoint))?;

        info!("Logged in as {}", email);
        Ok(notes)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    /// Fetch the server's status block (online users, note counts, ...).
    pub async fn status(&self) -> Result<serde_json::Value> {
        let status = self
            .client
            .get(self.url("status"))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .context("Status request failed")?
            .json()
            .await
            .context("Status response was not JSON")?;
        Ok(status)
    }
}

#[async_trait]
impl NoteClient for HedgeDocNotes {
    async fn create_document(&self, content: &str, meta: &NoteMeta) -> Result<String, ClientError> {
        let response = send_with_retry("note creation", || {
            self.client
                .post(self.url("new"))
                .header("Content-Type", "text/markdown")
                .body(content.to_string())
        })
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ClientError::Write(format!("creating note {:?}: {e}", meta.title_or_empty())))?;

        // The server redirects to the new note; its URL carries the id.
        let id = note_id_from_url(response.url().as_str());
        if id.is_empty() {
            return Err(ClientError::Write(format!(
                "no note id in response URL {}",
                response.url()
            )));
        }
        debug!("Created note {}", id);
        Ok(id)
    }

    async fn read_document(&self, id: &str) -> Result<String, ClientError> {
        let response = send_with_retry("note read", || {
            self.client.get(self.url(&format!("{id}/download")))
        })
        .await
        .map_err(|e| ClientError::Fetch(format!("note {id}: {e}")))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(id.to_string()));
        }
        response
            .error_for_status()
            .map_err(|e| ClientError::Fetch(format!("note {id}: {e}")))?
            .text()
            .await
            .map_err(|e| ClientError::Fetch(format!("note {id}: {e}")))
    }

    async fn get_ledger(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        let ledger: LedgerResponse = send_with_retry("ledger read", || {
            self.client.get(self.url("history"))
        })
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ClientError::Fetch(format!("ledger: {e}")))?
        .json()
        .await
        .map_err(|e| ClientError::Fetch(format!("ledger: {e}")))?;
        Ok(ledger.history)
    }

    async fn append_ledger(&self, entries: &[HistoryEntry]) -> Result<(), ClientError> {
        let payload = serde_json::to_string(entries)
            .map_err(|e| ClientError::Write(format!("ledger: {e}")))?;

        send_with_retry("ledger write", || {
            self.client
                .post(self.url("history"))
                .form(&[("history", payload.as_str())])
        })
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ClientError::Write(format!("ledger: {e}")))?;
        Ok(())
    }
}
