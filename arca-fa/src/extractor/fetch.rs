//! Bounded artifact fetching
//!
//! Remote artifacts are streamed into a named temporary file so a partial
//! download is cleaned up on every exit path (success, size overrun, fetch
//! failure). The fetch is bounded by a hard timeout and a size limit;
//! nothing here retries.

use reqwest::header::USER_AGENT;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::types::FileReference;

/// Artifact fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Reference cannot be resolved (missing file, bad URL)
    #[error("Invalid file reference: {0}")]
    InvalidReference(String),

    /// Fetch exceeded the configured timeout
    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    /// Network or HTTP failure
    #[error("Network error: {0}")]
    Network(String),

    /// Artifact exceeds the configured size limit
    #[error("Artifact larger than {limit} bytes")]
    TooLarge { limit: u64 },

    /// I/O error while spooling the artifact
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bounded byte fetcher for submitted artifacts
pub struct FileFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: u64,
    user_agent: String,
}

impl FileFetcher {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: config.fetch_timeout(),
            max_bytes: config.max_artifact_bytes,
            user_agent: config.user_agent.clone(),
        }
    }

    /// Fetch the artifact bytes for a file reference
    pub async fn fetch(&self, file_ref: &FileReference) -> Result<Vec<u8>, FetchError> {
        match file_ref {
            FileReference::Local(path) => {
                let meta = tokio::fs::metadata(path).await.map_err(|e| {
                    FetchError::InvalidReference(format!("{}: {}", path.display(), e))
                })?;
                if meta.len() > self.max_bytes {
                    return Err(FetchError::TooLarge {
                        limit: self.max_bytes,
                    });
                }
                Ok(tokio::fs::read(path).await?)
            }
            FileReference::Url(url) => self.fetch_url(url).await,
        }
    }

    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!(url, timeout = ?self.timeout, "Fetching artifact");

        let mut response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(FetchError::Network(format!(
                "HTTP {} fetching {}",
                response.status(),
                url
            )));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Err(FetchError::TooLarge {
                    limit: self.max_bytes,
                });
            }
        }

        // Spool into a temp file; RAII drop guarantees cleanup on every
        // exit path below, including the size-overrun and chunk-error ones.
        let mut spool = NamedTempFile::new()?;
        let mut received: u64 = 0;

        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            received += chunk.len() as u64;
            if received > self.max_bytes {
                warn!(url, received, limit = self.max_bytes, "Artifact too large");
                return Err(FetchError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            spool.write_all(&chunk)?;
        }
        spool.flush()?;

        debug!(url, bytes = received, "Artifact fetched");
        let bytes = std::fs::read(spool.path())?;
        Ok(bytes)
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Network(err.to_string())
        }
    }
}
