//! Error types for the updash CLI.
//!
//! Application plumbing uses `anyhow` so file and parse errors carry context. Failures coming
//! out of the Up API client are classified into [`ApiError`] first so the retry loop and the
//! user-facing messages can tell transient trouble apart from bad input.

use thiserror::Error;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the Up API client and the credential store.
///
/// Only [`ApiError::Network`] and [`ApiError::Server`] are transient; everything else fails
/// immediately because a retry cannot change the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// HTTP 401: the token was rejected.
    #[error("invalid API token, check the token and try again")]
    Unauthenticated,

    /// HTTP 403: the token lacks permission for the endpoint.
    #[error("access denied, the API token does not have permission for this request")]
    Forbidden,

    /// HTTP 429.
    #[error("too many requests, wait a moment and try again")]
    RateLimited,

    /// Any HTTP 5xx.
    #[error("the Up API is currently unavailable (HTTP {0}), try again later")]
    Server(u16),

    /// No response was received: DNS, connect, TLS or timeout trouble.
    #[error("network error: {0}")]
    Network(String),

    /// A response arrived but did not match the expected envelope shape.
    #[error("unexpected response format from the Up API: {0}")]
    InvalidResponse(String),

    /// Bad input caught before any request was made.
    #[error("{0}")]
    Validation(String),

    /// The stored token blob could not be decrypted.
    #[error("could not decrypt the stored API token, the PIN is probably wrong")]
    Decryption,

    /// Any HTTP status not covered above.
    #[error("unexpected response from the Up API (HTTP {status}): {detail}")]
    Unknown { status: u16, detail: String },
}

impl ApiError {
    /// Classifies a non-success HTTP status. `detail` comes from the API's error envelope when
    /// one was parseable, otherwise a short placeholder.
    pub(crate) fn from_status(status: u16, detail: impl Into<String>) -> Self {
        match status {
            401 => ApiError::Unauthenticated,
            403 => ApiError::Forbidden,
            429 => ApiError::RateLimited,
            500..=599 => ApiError::Server(status),
            _ => ApiError::Unknown {
                status,
                detail: detail.into(),
            },
        }
    }

    /// True when a retry with backoff is worth attempting.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Server(_))
    }
}
