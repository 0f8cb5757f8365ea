//! Request context handed to tenant resolution.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

static REQUEST_SEQ: AtomicU32 = AtomicU32::new(0);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        let id = format!(
            "{:x}-{:x}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos(),
            REQUEST_SEQ.fetch_add(1, Ordering::Relaxed)
        );
        Self(id)
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// HTTP headers.
pub type Headers = HashMap<String, String>;

/// The parts of an incoming page request that tenant resolution may look at.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// Host the request was addressed to (e.g. `acme.shop.example`).
    pub host: String,
    /// Request path.
    pub path: String,
    /// HTTP headers.
    pub headers: Headers,
}

impl RequestContext {
    /// Create a new request context.
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::generate(),
            host: host.into(),
            path: path.into(),
            headers: HashMap::new(),
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Host with any port suffix removed, lowercased.
    pub fn hostname(&self) -> String {
        let host = self.host.rsplit_once(':').map_or(self.host.as_str(), |(h, port)| {
            if port.chars().all(|c| c.is_ascii_digit()) {
                h
            } else {
                self.host.as_str()
            }
        });
        host.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let ctx = RequestContext::new("acme.shop.test", "/").with_header("X-Store", "acme");
        assert_eq!(ctx.header("x-store"), Some("acme"));
        assert_eq!(ctx.header("X-Missing"), None);
    }

    #[test]
    fn test_hostname_strips_port() {
        assert_eq!(RequestContext::new("Acme.Shop.test:8080", "/").hostname(), "acme.shop.test");
        assert_eq!(RequestContext::new("acme.shop.test", "/").hostname(), "acme.shop.test");
    }
}
