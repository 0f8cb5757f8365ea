//! Fetch error types.

use std::time::Duration;

use thiserror::Error;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors a cached read can fail with.
///
/// A failed read never modifies the cache; any existing entry for the key is
/// left as it was.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The deadline elapsed before the response arrived.
    #[error("Request timed out after {timeout:?}")]
    Timeout {
        /// Deadline that was exceeded.
        timeout: Duration,
    },

    /// Network failure below the HTTP layer.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The origin answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Message from the error body, or the caller's default.
        message: String,
    },

    /// `304 Not Modified` arrived but there is no entry to replay.
    #[error(
        "Received 304 Not Modified for {} with no cached entry to replay",
        .key.as_deref().unwrap_or("an uncached request")
    )]
    CacheProtocol {
        /// Cache key of the read, if it had one.
        key: Option<String>,
    },

    /// The body of a successful response could not be decoded.
    #[error("Invalid response format: {0}")]
    InvalidResponseFormat(String),

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// HTTP status code, for status errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this is an authentication or authorization failure.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 401 | 403, .. })
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 404, .. })
    }

    /// Whether retrying the same read may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport(_) => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
