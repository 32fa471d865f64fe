//! Error types for price fetch operations.

use thiserror::Error;

/// Errors that can occur while fetching prices from a provider.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider returned HTTP {0}")]
    Status(u16),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            FeedError::Status(status.as_u16())
        } else if err.is_decode() {
            FeedError::Parse(err.to_string())
        } else {
            FeedError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Parse(err.to_string())
    }
}

impl FeedError {
    /// Returns true if this error is transient and likely to succeed on the next refresh.
    /// Malformed payloads and client errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            FeedError::Request(_) | FeedError::Timeout(_) => true,
            FeedError::Status(status) => *status == 429 || *status >= 500,
            FeedError::Parse(_) => false,
        }
    }
}
