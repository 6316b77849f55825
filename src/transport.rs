//! HTTP transport shared by the source adapters and the document fetcher.
//!
//! [`Transport`] is a thin wrapper over a pooled [`reqwest::Client`] that
//! maps non-success statuses into [`ArchiveError::Transport`] and adds
//! exponential backoff with jitter to page-level GETs. Document downloads
//! go through [`Transport::get_bytes`], which does not retry; a large PDF
//! that failed halfway is cheaper to report than to replay.
//!
//! # Retry Strategy
//!
//! - Maximum 3 attempts per page fetch
//! - Exponential backoff starting at 500 ms
//! - Maximum delay capped at 10 seconds
//! - Random jitter (0-250 ms) added to prevent thundering herd

use std::time::{Duration, Instant};

use rand::{Rng, rng};
use reqwest::header::CONTENT_TYPE;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use crate::errors::{ArchiveError, Result};

const MAX_RETRIES: usize = 3;
const BASE_DELAY: Duration = Duration::from_millis(500);
const MAX_DELAY: Duration = Duration::from_secs(10);

/// Shared HTTP GET capability with a configurable timeout.
///
/// Cloning is cheap; the underlying client keeps its own connection pool
/// and may be used concurrently without external locking.
#[derive(Clone, Debug)]
pub struct Transport {
    client: reqwest::Client,
}

impl Transport {
    /// Build a transport with the given request timeout.
    ///
    /// Pass `None` to disable the timeout entirely. The document fetcher
    /// relies on that to avoid truncating large, slow PDF downloads.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ArchiveError::transport("building http client", e))?;
        Ok(Self { client })
    }

    /// GET a page body as text, retrying transient failures with backoff.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn get_text(&self, url: &str) -> Result<String> {
        self.get_text_inner(url, false).await
    }

    /// Same as [`get_text`] but sends a `Content-Type: application/json`
    /// header. The Rajya Sabha search endpoint rejects requests without it.
    ///
    /// [`get_text`]: Transport::get_text
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn get_text_json(&self, url: &str) -> Result<String> {
        self.get_text_inner(url, true).await
    }

    async fn get_text_inner(&self, url: &str, json_header: bool) -> Result<String> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.try_get_text(url, json_header).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    if attempt >= MAX_RETRIES {
                        warn!(
                            attempt,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            error = %e,
                            "GET exhausted retries"
                        );
                        return Err(e);
                    }

                    let mut delay = BASE_DELAY.saturating_mul(1 << (attempt - 1));
                    if delay > MAX_DELAY {
                        delay = MAX_DELAY;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(attempt, max = MAX_RETRIES, ?delay, error = %e, "GET failed; backing off");
                    sleep(delay).await;
                }
            }
        }
    }

    async fn try_get_text(&self, url: &str, json_header: bool) -> Result<String> {
        debug!(%url, "GET");
        let mut request = self.client.get(url);
        if json_header {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        let response = request
            .send()
            .await
            .map_err(|e| ArchiveError::transport(format!("GET {url}"), e))?
            .error_for_status()
            .map_err(|e| ArchiveError::transport(format!("GET {url}"), e))?;
        response
            .text()
            .await
            .map_err(|e| ArchiveError::transport(format!("reading body of {url}"), e))
    }

    /// GET a document body as raw bytes. No retry.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!(%url, "GET (bytes)");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ArchiveError::transport(format!("GET {url}"), e))?
            .error_for_status()
            .map_err(|e| ArchiveError::transport(format!("GET {url}"), e))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ArchiveError::transport(format!("reading body of {url}"), e))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_builds_with_and_without_timeout() {
        assert!(Transport::new(Some(Duration::from_secs(30))).is_ok());
        assert!(Transport::new(None).is_ok());
    }

    #[test]
    fn test_backoff_delay_is_capped() {
        // Mirrors the delay computation in get_text_inner.
        let attempt = 20usize;
        let mut delay = BASE_DELAY.saturating_mul(1 << (attempt - 1));
        if delay > MAX_DELAY {
            delay = MAX_DELAY;
        }
        assert_eq!(delay, MAX_DELAY);
    }
}
