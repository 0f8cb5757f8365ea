//! Read-through client over a shared cache store.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use edge_cache::{tenant_pattern, CacheEntry, CacheStatus, CacheStore, ReadPolicy};
use edge_core::{DataCacheConfig, RequestContext, RequestId, TenantId};
use edge_observability::CacheMetrics;
use http::header::{HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH};
use http::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::Instrument;

use crate::error::{FetchError, FetchResult};
use crate::interpret::{interpret_response, Interpreted};
use crate::request::FetchRequest;
use crate::resource::Resource;
use crate::timeout::DeadlineFetcher;
use crate::transport::{ReqwestTransport, Transport};

/// Header carrying the page request id to the origin.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Overrides for a single read.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// TTL for this read; the client default when `None`.
    pub ttl: Option<Duration>,
    /// Deadline for this read; the client default when `None`.
    pub timeout: Option<Duration>,
    /// Extra request headers (auth, locale, ...).
    pub headers: HeaderMap,
    /// Page request this read serves. Logged and sent as `x-request-id`.
    pub request_id: Option<RequestId>,
}

impl ReadOptions {
    /// Options that change nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TTL.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set the deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a request header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Tag the read with a page request id.
    pub fn request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Options for a read made while serving `ctx`.
    pub fn for_request(ctx: &RequestContext) -> Self {
        Self::new().request_id(ctx.request_id.clone())
    }
}

/// Revalidating reader.
///
/// A read returns the stored payload while it is within its TTL. Past the TTL
/// it asks the origin, sending `If-None-Match` / `If-Modified-Since` when the
/// stale entry has validators, and either replays the entry on `304` or stores
/// the new payload. A failed read never modifies the store.
#[derive(Debug, Clone)]
pub struct FetchClient<T = Value, Tr = ReqwestTransport> {
    fetcher: DeadlineFetcher<Tr>,
    store: CacheStore<T>,
    base_url: Option<String>,
    default_policy: ReadPolicy,
    metrics: Arc<CacheMetrics>,
}

impl<T> FetchClient<T, ReqwestTransport>
where
    T: DeserializeOwned + Clone,
{
    /// Build a reqwest-backed client from configuration.
    pub fn from_config(config: &DataCacheConfig, store: CacheStore<T>) -> FetchResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;

        let mut client = Self::new(ReqwestTransport::from_client(http), store)
            .with_timeout(config.request_timeout())
            .with_default_ttl(config.default_ttl());
        if let Some(base_url) = &config.api_base_url {
            client = client.with_base_url(base_url.clone());
        }
        Ok(client)
    }
}

impl<T, Tr> FetchClient<T, Tr>
where
    T: DeserializeOwned + Clone,
    Tr: Transport,
{
    /// Create a client reading through `store`.
    pub fn new(transport: Tr, store: CacheStore<T>) -> Self {
        Self {
            fetcher: DeadlineFetcher::new(transport),
            store,
            base_url: None,
            default_policy: ReadPolicy::default(),
            metrics: Arc::new(CacheMetrics::new()),
        }
    }

    /// Prefix joined onto relative URLs.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Default deadline for every request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetcher = self.fetcher.with_timeout(timeout);
        self
    }

    /// Default TTL for reads that do not set one.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_policy = ReadPolicy::new(ttl);
        self
    }

    /// Record into shared counters.
    pub fn with_metrics(mut self, metrics: Arc<CacheMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The store this client reads through.
    pub fn store(&self) -> &CacheStore<T> {
        &self.store
    }

    /// The counters this client records into.
    pub fn metrics(&self) -> &Arc<CacheMetrics> {
        &self.metrics
    }

    /// Default deadline.
    pub fn timeout(&self) -> Duration {
        self.fetcher.timeout()
    }

    /// Default TTL.
    pub fn default_ttl(&self) -> Duration {
        self.default_policy.ttl
    }

    /// Read `cache_key` with the client defaults.
    pub async fn read(&self, url: &str, cache_key: &str, default_message: &str) -> FetchResult<T> {
        self.read_with(url, cache_key, default_message, &ReadOptions::default())
            .await
    }

    /// Read `cache_key` with per-read overrides.
    pub async fn read_with(
        &self,
        url: &str,
        cache_key: &str,
        default_message: &str,
        options: &ReadOptions,
    ) -> FetchResult<T> {
        self.read_with_status(url, cache_key, default_message, options)
            .await
            .map(|(data, _)| data)
    }

    /// Read `cache_key` and report how the read was satisfied.
    pub async fn read_with_status(
        &self,
        url: &str,
        cache_key: &str,
        default_message: &str,
        options: &ReadOptions,
    ) -> FetchResult<(T, CacheStatus)> {
        let span = tracing::debug_span!(
            "cache_read",
            key = cache_key,
            request_id = tracing::field::Empty
        );
        if let Some(id) = &options.request_id {
            span.record("request_id", tracing::field::display(id));
        }
        self.read_in_span(url, cache_key, default_message, options)
            .instrument(span)
            .await
    }

    async fn read_in_span(
        &self,
        url: &str,
        cache_key: &str,
        default_message: &str,
        options: &ReadOptions,
    ) -> FetchResult<(T, CacheStatus)> {
        let policy = options.ttl.map(ReadPolicy::new).unwrap_or(self.default_policy);
        let cached = self.store.get(cache_key);

        if let Some(entry) = cached.as_ref().filter(|e| policy.is_fresh_at(*e, Utc::now())) {
            tracing::debug!(key = cache_key, "cache hit");
            self.metrics.record_hit();
            return Ok((entry.data.clone(), CacheStatus::Hit));
        }

        self.metrics.record_miss();
        let mut request = FetchRequest::get(self.resolve_url(url)).headers(options.headers.clone());
        if let Some(id) = &options.request_id {
            match HeaderValue::from_str(&id.to_string()) {
                Ok(value) => request = request.header(HeaderName::from_static(REQUEST_ID_HEADER), value),
                Err(_) => tracing::warn!(request_id = %id, "request id is not a valid header value"),
            }
        }
        let stale = cached.is_some();
        if let Some(entry) = &cached {
            let (conditional, sent) = conditional_headers(request, entry, cache_key);
            request = conditional;
            if sent {
                self.metrics.record_revalidation();
            }
            tracing::debug!(key = cache_key, conditional = sent, "cache stale, revalidating");
        } else {
            tracing::debug!(key = cache_key, "cache miss");
        }

        let timeout = options.timeout.unwrap_or_else(|| self.fetcher.timeout());
        let outcome = self
            .fetcher
            .fetch_with_timeout(request, timeout)
            .await
            .and_then(|response| interpret_response(response, &self.store, Some(cache_key), default_message));

        match outcome {
            Ok(Interpreted::Replayed(data)) => {
                tracing::debug!(key = cache_key, "not modified, replayed cached entry");
                self.metrics.record_not_modified();
                Ok((data, CacheStatus::NotModified))
            }
            Ok(Interpreted::Empty(data)) => Ok((data, CacheStatus::Bypass)),
            Ok(Interpreted::Fresh { data, validated }) => {
                if !validated {
                    self.metrics.record_missing_validators();
                }
                self.metrics.record_refresh();
                let status = if stale {
                    CacheStatus::Refreshed
                } else {
                    CacheStatus::Miss
                };
                Ok((data, status))
            }
            Err(e) => {
                self.metrics
                    .record_failure(matches!(e, FetchError::Timeout { .. }));
                tracing::debug!(key = cache_key, error = %e, "read failed");
                Err(e)
            }
        }
    }

    /// Read a storefront resource for `tenant` with its default TTL.
    pub async fn read_resource(&self, resource: Resource, tenant: &TenantId, url: &str) -> FetchResult<T> {
        let key = resource.cache_key(tenant);
        self.read_with(
            url,
            key.as_str(),
            &resource.default_error_message(),
            &resource.read_options(),
        )
        .await
    }

    /// Fetch and decode without touching the store.
    pub async fn fetch_uncached(&self, url: &str, default_message: &str) -> FetchResult<T> {
        let response = self.fetcher.fetch(FetchRequest::get(self.resolve_url(url))).await?;
        interpret_response(response, &self.store, None, default_message).map(Interpreted::into_data)
    }

    /// Remove entries whose key contains `pattern`, or everything when `None`.
    pub fn evict(&self, pattern: Option<&str>) -> usize {
        self.store.evict(pattern)
    }

    /// Remove every entry scoped to `tenant`.
    pub fn evict_tenant(&self, tenant: &TenantId) -> usize {
        self.store.evict(Some(&tenant_pattern(tenant)))
    }

    fn resolve_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                if url.starts_with('/') {
                    format!("{}{}", base.trim_end_matches('/'), url)
                } else {
                    format!("{}/{}", base.trim_end_matches('/'), url)
                }
            }
            _ => url.to_string(),
        }
    }
}

impl<Tr: Transport> FetchClient<Value, Tr> {
    /// Read through a JSON store and decode the payload as `U`.
    pub async fn read_as<U: DeserializeOwned>(
        &self,
        url: &str,
        cache_key: &str,
        default_message: &str,
        options: &ReadOptions,
    ) -> FetchResult<U> {
        let value = self.read_with(url, cache_key, default_message, options).await?;
        serde_json::from_value(value)
            .map_err(|e| FetchError::InvalidResponseFormat(format!("{cache_key}: {e}")))
    }
}

/// Attach the stale entry's validators. Returns whether any were attached.
fn conditional_headers<T>(
    mut request: FetchRequest,
    entry: &CacheEntry<T>,
    cache_key: &str,
) -> (FetchRequest, bool) {
    let mut sent = false;
    for (name, value) in [
        (IF_NONE_MATCH, entry.etag.as_deref()),
        (IF_MODIFIED_SINCE, entry.last_modified.as_deref()),
    ] {
        let Some(value) = value else { continue };
        match HeaderValue::from_str(value) {
            Ok(value) => {
                request = request.header(name, value);
                sent = true;
            }
            Err(_) => {
                tracing::warn!(key = cache_key, header = %name, "stored validator is not a valid header value");
            }
        }
    }
    (request, sent)
}
