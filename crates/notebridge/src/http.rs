//! Shared HTTP plumbing: bounded retry with exponential backoff.

use std::time::Duration;

use tracing::warn;

/// Retries after the first attempt.
pub const MAX_RETRIES: u32 = 3;

/// Initial backoff delay; doubled after each retry.
const INITIAL_DELAY: Duration = Duration::from_secs(2);

/// Send a request, retrying transient failures.
///
/// `build` must produce a fresh `RequestBuilder` per attempt. A response
/// with a 5xx status or a connection/timeout error is retried up to
/// `MAX_RETRIES` times; anything else is returned as-is. Client errors are
/// not retried, the caller decides what a 4xx means.
pub async fn send_with_retry<F>(what: &str, build: F) -> reqwest::Result<reqwest::Response>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut delay = INITIAL_DELAY;
    let mut attempt = 0;
    loop {
        let result = build().send().await;
        let retryable = match &result {
            Ok(response) => response.status().is_server_error(),
            Err(e) => e.is_connect() || e.is_timeout(),
        };
        if !retryable || attempt >= MAX_RETRIES {
            return result;
        }
        attempt += 1;
        warn!(
            "{} failed, retry {}/{} in {:?}",
            what, attempt, MAX_RETRIES, delay
        );
        tokio::time::sleep(delay).await;
        delay *= 2;
    }
}
