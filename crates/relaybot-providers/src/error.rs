//! Provider error type.
//!
//! Failures stay typed inside a connector and are rendered to a single
//! user-facing diagnostic string at the `respond()` boundary — the chat
//! channel has no side channel for structured errors.

use thiserror::Error;

/// Everything that can go wrong during a single backend call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("backend returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// Backend answered 2xx but the reply text was not where it should be.
    #[error("backend response missing `{0}`")]
    MalformedResponse(&'static str),

    /// Session-token login failed; the cached token (if any) is untouched.
    #[error("session token refresh failed: {0}")]
    SessionRefresh(String),

    /// OAuth access-token refresh failed; the cached token is untouched.
    #[error("access token refresh failed: {0}")]
    TokenRefresh(String),

    /// The triggering message's lifecycle ended before the call completed.
    #[error("request cancelled")]
    Cancelled,
}
