//! Failure taxonomy reported to the user.
//!
//! Every error crossing a network boundary ends up as a [`Failure`]: a kind
//! the UI can branch on plus a message it can show. Exhaustion and timeouts
//! stay distinct from generic server errors because an operator reacts to
//! them differently.

use tally_http::TallyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Transport failed before a response arrived.
    NetworkError,
    /// Client-side deadline exceeded; the request was aborted.
    Timeout,
    /// 5xx from the server.
    ServerError,
    /// 503 on the vote path: no database connection was available.
    ResourceExhausted,
    /// Any other non-2xx.
    RequestFailed,
    /// The live-update subscription broke.
    StreamError,
    /// The user cancelled the request.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    pub status: Option<u16>,
}

pub const NETWORK_MESSAGE: &str = "Network error. Please check the connection and try again.";
pub const FETCH_TIMEOUT_MESSAGE: &str = "Timed out loading results from the server.";
pub const FETCH_SERVER_MESSAGE: &str =
    "Backend database problem: results are temporarily unavailable.";
pub const STREAM_MESSAGE: &str = "Live updates interrupted. Reconnecting...";
pub const VOTE_TIMEOUT_MESSAGE: &str =
    "The vote request timed out, likely because the backend ran out of resources.";
pub const VOTE_EXHAUSTED_MESSAGE: &str =
    "The backend resource pool is exhausted. Your vote was not recorded.";
pub const VOTE_GENERIC_MESSAGE: &str = "Vote failed: Unknown error";
pub const CANCELLED_MESSAGE: &str = "The request was cancelled.";

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Failure {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn network() -> Self {
        Self::new(FailureKind::NetworkError, NETWORK_MESSAGE)
    }

    pub fn stream(cause: &TallyError) -> Self {
        tracing::debug!("stream failure cause: {}", cause);
        Self::new(FailureKind::StreamError, STREAM_MESSAGE)
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, CANCELLED_MESSAGE)
    }

    /// Classifies a transport error from a one-shot request.
    pub fn from_transport(err: &TallyError, timeout_message: &str) -> Self {
        match err {
            e if e.is_timeout() => Self::new(FailureKind::Timeout, timeout_message),
            e if e.is_transport() => Self::network(),
            other => Self::new(FailureKind::RequestFailed, other.to_string()),
        }
    }

    /// Classifies a non-2xx response on a read path (`/votes`, `/ready`).
    pub fn from_fetch_status(status: u16, detail: Option<String>) -> Self {
        let failure = if (500..600).contains(&status) {
            Self::new(
                FailureKind::ServerError,
                detail.unwrap_or_else(|| FETCH_SERVER_MESSAGE.to_string()),
            )
        } else {
            Self::new(
                FailureKind::RequestFailed,
                detail.unwrap_or_else(|| format!("Request failed (HTTP {}).", status)),
            )
        };
        failure.with_status(status)
    }

    /// Classifies a non-2xx response to `POST /vote`.
    pub fn from_vote_status(status: u16, detail: Option<String>) -> Self {
        let failure = match status {
            503 => Self::new(FailureKind::ResourceExhausted, VOTE_EXHAUSTED_MESSAGE),
            500..=599 => Self::new(
                FailureKind::ServerError,
                detail.unwrap_or_else(|| VOTE_GENERIC_MESSAGE.to_string()),
            ),
            _ => Self::new(
                FailureKind::RequestFailed,
                detail
                    .map(|d| format!("Vote failed: {}", d))
                    .unwrap_or_else(|| VOTE_GENERIC_MESSAGE.to_string()),
            ),
        };
        failure.with_status(status)
    }

    /// Whether the results view keeps a banner up for this failure.
    pub fn shows_banner(&self) -> bool {
        matches!(
            self.kind,
            FailureKind::StreamError
                | FailureKind::NetworkError
                | FailureKind::ServerError
                | FailureKind::Timeout
                | FailureKind::RequestFailed
        )
    }
}
