//! Error types for the content-source client.

use thiserror::Error;

/// Errors that can occur when talking to the content source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source no longer accepts the current session. This is the
    /// fatal invalidation signal: the caller is expected to clear the
    /// persisted session and terminate for a supervised restart.
    #[error("session rejected by content source: {0}")]
    LoginRequired(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an unexpected status or shape
    #[error("unexpected API response: {0}")]
    Api(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A configured handle could not be resolved to a user id
    #[error("unknown account: {0}")]
    UnknownAccount(String),
}

impl SourceError {
    /// Whether this error is the session-invalidation signal.
    #[must_use]
    pub const fn is_login_required(&self) -> bool {
        matches!(self, Self::LoginRequired(_))
    }
}
