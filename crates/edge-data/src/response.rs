//! Raw HTTP responses.

use edge_cache::Validators;
use http::header::{HeaderName, ETAG, LAST_MODIFIED};
use http::{HeaderMap, StatusCode};

/// A response as received from a [`Transport`](crate::Transport).
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The response body.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Create a new response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check for `304 Not Modified`.
    pub fn is_not_modified(&self) -> bool {
        self.status == StatusCode::NOT_MODIFIED
    }

    /// Check for `204 No Content`.
    pub fn is_no_content(&self) -> bool {
        self.status == StatusCode::NO_CONTENT
    }

    /// Get a header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `ETag` and `Last-Modified` as exposed by the origin.
    ///
    /// Cross-origin responses only carry these when the origin lists them in
    /// `Access-Control-Expose-Headers`.
    pub fn validators(&self) -> Validators {
        let read = |name: HeaderName| {
            self.headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };
        Validators {
            etag: read(ETAG),
            last_modified: read(LAST_MODIFIED),
        }
    }
}
