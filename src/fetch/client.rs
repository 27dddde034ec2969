use std::time::Duration;

use futures::StreamExt;
use thiserror::Error;

use super::parser::parse_headlines;
use crate::repo::Headline;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors absorbed inside a fetch attempt. Callers only ever see a
/// [`TransportStatus`]; these exist for the diagnostic log.
#[derive(Debug, Error)]
enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("response too large")]
    ResponseTooLarge,
    #[error("parse error: {0}")]
    Parse(String),
}

/// Transport status of one fetch attempt.
///
/// Status codes in the conventional success range count as success; anything
/// else, including attempts that never produced an HTTP response, counts as
/// failure, uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportStatus(pub u16);

impl TransportStatus {
    /// Placeholder for attempts with no HTTP response (DNS, timeout, TLS,
    /// unparseable body).
    pub const FAILED: TransportStatus = TransportStatus(0);

    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }
}

/// Result of one fetch attempt: transport status plus, on success, the
/// headline records parsed from the body (feed name left blank for the
/// caller to fill).
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub status: TransportStatus,
    pub headlines: Vec<Headline>,
}

impl Default for TransportStatus {
    fn default() -> Self {
        TransportStatus::FAILED
    }
}

/// HTTP fetch client. Cheap to clone; all clones share one connection pool.
#[derive(Clone, Default)]
pub struct Client {
    http: reqwest::Client,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches and parses one feed. Never raises: every failure mode is
    /// logged and folded into the returned transport status.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        match self.try_fetch(url).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(url, error = %e, "fetch attempt failed");
                FetchOutcome::default()
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        let response = tokio::time::timeout(FETCH_TIMEOUT, self.http.get(url).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        let status = TransportStatus(response.status().as_u16());
        if !status.is_success() {
            return Ok(FetchOutcome {
                status,
                headlines: Vec::new(),
            });
        }

        let bytes = read_limited_bytes(response, MAX_FEED_SIZE).await?;
        let headlines =
            parse_headlines(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

        Ok(FetchOutcome { status, headlines })
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
