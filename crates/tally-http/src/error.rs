//! Error types for tally HTTP operations.

use std::io;
use thiserror::Error;

/// Result type for tally HTTP operations.
pub type Result<T> = std::result::Result<T, TallyError>;

/// Errors that can occur while talking to the polling service.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TallyError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Subscription closed")]
    SubscriptionClosed,

    #[error("Expected a 2xx status for the event stream, got {0}")]
    InvalidSubscriptionStatus(u16),

    #[error("Operation timed out")]
    Timeout,

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TallyError {
    /// Maps a reqwest failure, keeping client-side deadlines distinct.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TallyError::Timeout
        } else {
            TallyError::Http(err.to_string())
        }
    }

    /// Whether the failure happened before any response was received.
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            TallyError::Http(_) | TallyError::Io(_) | TallyError::SubscriptionClosed
        )
    }

    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, TallyError::Timeout)
    }
}
