//! GitHub contents-API implementation of `RepoClient`.
//!
//! Documents live as files in a repository; listing walks the contents API
//! directory by directory, reads come back base64-encoded, and writes go
//! through the create-or-update endpoint (which needs the current blob sha
//! when the file already exists).

use anyhow::Result;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use notebridge_core::client::{ClientError, RepoClient};

use crate::http::send_with_retry;

const ENDPOINT: &str = "https://api.github.com";

pub struct GitHubRepo {
    client: reqwest::Client,
    owner: String,
    repo: String,
    token: String,
}

/// The subset of a contents-API item this client reads.
#[derive(Debug, Deserialize)]
struct ContentItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: Option<String>,
    content: Option<String>,
}

impl GitHubRepo {
    pub fn new(owner: &str, repo: &str, token: &str) -> Result<Self> {
        // GitHub rejects requests without a user agent.
        let client = reqwest::Client::builder()
            .user_agent("notebridge")
            .build()?;
        Ok(Self {
            client,
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
        })
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{ENDPOINT}/repos/{}/{}/contents/{}",
            self.owner, self.repo, path
        )
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
    }

    /// Fetch the current blob sha of `path`, or None when the file does not
    /// exist yet.
    async fn current_sha(&self, path: &str) -> Result<Option<String>, ClientError> {
        let url = self.contents_url(path);
        let response = send_with_retry("sha lookup", || self.request(self.client.get(&url)))
            .await
            .map_err(|e| ClientError::Fetch(format!("{path}: {e}")))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let item: ContentItem = response
            .error_for_status()
            .map_err(|e| ClientError::Fetch(format!("{path}: {e}")))?
            .json()
            .await
            .map_err(|e| ClientError::Fetch(format!("{path}: {e}")))?;
        Ok(item.sha)
    }
}

/// Decode a contents-API blob. The API wraps base64 at 60 columns, so the
/// payload is whitespace-stripped before decoding.
fn decode_content(encoded: &str) -> Result<String, ClientError> {
    let compact: String = encoded.split_whitespace().collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| ClientError::Fetch(format!("Invalid base64 payload: {e}")))?;
    String::from_utf8(bytes).map_err(|e| ClientError::Fetch(format!("Invalid UTF-8 payload: {e}")))
}

#[async_trait]
impl RepoClient for GitHubRepo {
    async fn list_documents(&self) -> Result<Vec<String>, ClientError> {
        let mut files = Vec::new();
        let mut pending = vec![String::new()];

        // Walk directories iteratively; each listing may queue more.
        while let Some(dir) = pending.pop() {
            let url = self.contents_url(&dir);
            let items: Vec<ContentItem> =
                send_with_retry("repository listing", || self.request(self.client.get(&url)))
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| ClientError::Fetch(format!("listing {dir:?}: {e}")))?
                    .json()
                    .await
                    .map_err(|e| ClientError::Fetch(format!("listing {dir:?}: {e}")))?;

            for item in items {
                match item.kind.as_str() {
                    "file" => files.push(item.path),
                    "dir" => pending.push(item.path),
                    other => debug!("Ignoring {} ({})", item.path, other),
                }
            }
        }

        Ok(files)
    }

    async fn read_document(&self, path: &str) -> Result<String, ClientError> {
        let url = self.contents_url(path);
        let response = send_with_retry("file read", || self.request(self.client.get(&url)))
            .await
            .map_err(|e| ClientError::Fetch(format!("{path}: {e}")))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(path.to_string()));
        }
        let item: ContentItem = response
            .error_for_status()
            .map_err(|e| ClientError::Fetch(format!("{path}: {e}")))?
            .json()
            .await
            .map_err(|e| ClientError::Fetch(format!("{path}: {e}")))?;

        match item.content {
            Some(encoded) => decode_content(&encoded),
            None => Err(ClientError::Fetch(format!("{path} has no content payload"))),
        }
    }

    async fn write_document(
        &self,
        path: &str,
        content: &str,
        change_note: &str,
    ) -> Result<(), ClientError> {
        let sha = self.current_sha(path).await?;

        let mut body = json!({
            "message": change_note,
            "content": BASE64.encode(content.as_bytes()),
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }

        let url = self.contents_url(path);
        send_with_retry("file write", || {
            self.request(self.client.put(&url)).json(&body)
        })
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ClientError::Write(format!("{path}: {e}")))?;

        debug!("Wrote {} ({})", path, change_note);
        Ok(())
    }
}
