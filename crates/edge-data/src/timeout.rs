//! Deadline-bound fetching.

use std::time::{Duration, Instant};

use crate::error::FetchError;
use crate::request::FetchRequest;
use crate::response::RawResponse;
use crate::transport::Transport;

/// Default deadline for one request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs requests through a [`Transport`] under a hard deadline.
///
/// When the deadline elapses the in-flight send future is dropped, which
/// aborts the transfer, and the caller gets [`FetchError::Timeout`]. The
/// deadline timer lives inside the same future, so it is released on every
/// exit path.
#[derive(Debug, Clone)]
pub struct DeadlineFetcher<Tr> {
    transport: Tr,
    timeout: Duration,
}

impl<Tr: Transport> DeadlineFetcher<Tr> {
    /// Create a fetcher with the default 10 second deadline.
    pub fn new(transport: Tr) -> Self {
        Self {
            transport,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The underlying transport.
    pub fn transport(&self) -> &Tr {
        &self.transport
    }

    /// Send under the configured deadline.
    pub async fn fetch(&self, request: FetchRequest) -> Result<RawResponse, FetchError> {
        self.fetch_with_timeout(request, self.timeout).await
    }

    /// Send under an explicit deadline.
    ///
    /// Adds `Content-Type: application/json` unless the body is binary or a
    /// content type is already set.
    pub async fn fetch_with_timeout(
        &self,
        mut request: FetchRequest,
        timeout: Duration,
    ) -> Result<RawResponse, FetchError> {
        request.apply_default_content_type();
        let url = request.url().to_string();
        let started = Instant::now();

        match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(result) => {
                tracing::debug!(
                    url = %url,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    ok = result.is_ok(),
                    "fetch finished"
                );
                result
            }
            Err(_) => {
                tracing::warn!(
                    url = %url,
                    timeout_ms = timeout.as_millis() as u64,
                    "fetch deadline exceeded, transfer cancelled"
                );
                Err(FetchError::Timeout { timeout })
            }
        }
    }
}
