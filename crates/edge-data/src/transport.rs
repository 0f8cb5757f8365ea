//! The network seam.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::request::FetchRequest;
use crate::response::RawResponse;

/// Sends one request and returns the complete response.
///
/// Dropping the returned future must abort the transfer; the deadline
/// fetcher relies on this to cancel requests that overrun.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request.
    async fn send(&self, request: FetchRequest) -> Result<RawResponse, FetchError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: FetchRequest) -> Result<RawResponse, FetchError> {
        (**self).send(request).await
    }
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing client (shared connection pool, custom TLS, ...).
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: FetchRequest) -> Result<RawResponse, FetchError> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = self.http.request(method, url.as_str()).headers(headers);
        if let Some(bytes) = body.into_bytes() {
            builder = builder.body(bytes);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                FetchError::InvalidRequest(e.to_string())
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(RawResponse::new(status, headers, body.to_vec()))
    }
}
