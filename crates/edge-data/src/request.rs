//! Outbound request description.

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method};
use serde::Serialize;

use crate::error::FetchError;

/// Request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// Serialized JSON.
    Json(Vec<u8>),
    /// Plain text.
    Text(String),
    /// Binary or multipart payload whose content type (and boundary) the
    /// caller or the transport supplies.
    Binary(Vec<u8>),
}

impl RequestBody {
    /// Whether the JSON content-type default must be left off.
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// Body bytes, if any.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Empty => None,
            Self::Json(bytes) | Self::Binary(bytes) => Some(bytes),
            Self::Text(text) => Some(text.into_bytes()),
        }
    }
}

/// A request handed to a [`Transport`](crate::Transport).
#[derive(Debug, Clone)]
pub struct FetchRequest {
    method: Method,
    url: String,
    headers: HeaderMap,
    body: RequestBody,
}

impl FetchRequest {
    /// Create a new request.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    /// Create a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Add a header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a header from strings, validating both halves.
    pub fn try_header(self, name: &str, value: &str) -> Result<Self, FetchError> {
        let name = HeaderName::try_from(name)
            .map_err(|e| FetchError::InvalidRequest(format!("header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| FetchError::InvalidRequest(format!("header {name}: {e}")))?;
        Ok(self.header(name, value))
    }

    /// Add several headers.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set the body as JSON.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| FetchError::InvalidRequest(format!("JSON body: {e}")))?;
        self.body = RequestBody::Json(bytes);
        Ok(self)
    }

    /// Set the body as plain text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.body = RequestBody::Text(text.into());
        self
    }

    /// Set a binary body. No content type is added on your behalf.
    pub fn binary(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = RequestBody::Binary(bytes.into());
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request headers.
    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    /// Look up a header as a string.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Request body.
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Apply the content-type policy: JSON unless the body is binary or the
    /// caller already chose a type.
    pub(crate) fn apply_default_content_type(&mut self) {
        if self.body.is_binary() || self.headers.contains_key(CONTENT_TYPE) {
            return;
        }
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    /// Split into parts for a transport.
    pub fn into_parts(self) -> (Method, String, HeaderMap, RequestBody) {
        (self.method, self.url, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_defaults() {
        let req = FetchRequest::get("https://api.shop.test/config");
        assert_eq!(*req.method(), Method::GET);
        assert_eq!(req.url(), "https://api.shop.test/config");
        assert!(req.header_map().is_empty());
        assert_eq!(req.body(), &RequestBody::Empty);
    }

    #[test]
    fn test_content_type_defaults_to_json() {
        let mut req = FetchRequest::get("/config");
        req.apply_default_content_type();
        assert_eq!(req.header_str("content-type"), Some("application/json"));
    }

    #[test]
    fn test_content_type_left_unset_for_binary() {
        let mut req = FetchRequest::post("/upload").binary(vec![0u8, 1, 2]);
        req.apply_default_content_type();
        assert!(req.header_str("content-type").is_none());
    }

    #[test]
    fn test_explicit_content_type_wins() {
        let mut req = FetchRequest::post("/notes")
            .text("hi")
            .try_header("Content-Type", "text/plain")
            .unwrap();
        req.apply_default_content_type();
        assert_eq!(req.header_str("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_json_body() {
        let req = FetchRequest::post("/x").json(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(req.body().clone().into_bytes().unwrap(), br#"{"a":1}"#);
    }

    #[test]
    fn test_invalid_header_rejected() {
        let err = FetchRequest::get("/x").try_header("If-None-Match", "bad\nvalue").unwrap_err();
        assert!(matches!(err, FetchError::InvalidRequest(_)));
    }
}
