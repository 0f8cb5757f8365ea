//! Turning raw responses into payloads.

use chrono::Utc;
use edge_cache::{CacheEntry, CacheStore};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchError;
use crate::response::RawResponse;

/// What a response turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpreted<T> {
    /// `304 Not Modified`: the stored payload, timestamp refreshed.
    Replayed(T),
    /// `204 No Content`: payload decoded from JSON `null`; cache untouched.
    Empty(T),
    /// New payload, written to the store when a key was supplied.
    Fresh {
        /// Decoded payload.
        data: T,
        /// Whether the origin exposed an `ETag` or `Last-Modified`.
        validated: bool,
    },
}

impl<T> Interpreted<T> {
    /// Take the payload.
    pub fn into_data(self) -> T {
        match self {
            Self::Replayed(data) | Self::Empty(data) | Self::Fresh { data, .. } => data,
        }
    }
}

/// Error body shapes the storefront API answers with.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .or(self.detail)
            .filter(|m| !m.trim().is_empty())
    }
}

/// Interpret a response for `cache_key`.
///
/// - `304` replays the stored entry, refreshing only its timestamp; with no
///   entry this is [`FetchError::CacheProtocol`].
/// - `204` yields the payload decoded from `null` and leaves the cache alone.
/// - Any other non-2xx becomes [`FetchError::HttpStatus`] with the message
///   from the error body, or `default_message` if the body has none.
/// - A 2xx body is decoded and, when `cache_key` is given, stored with the
///   response's validators and the current time.
pub fn interpret_response<T>(
    response: RawResponse,
    store: &CacheStore<T>,
    cache_key: Option<&str>,
    default_message: &str,
) -> Result<Interpreted<T>, FetchError>
where
    T: DeserializeOwned + Clone,
{
    if response.is_not_modified() {
        let replayed = cache_key.and_then(|key| store.confirm_fresh(key, Utc::now()));
        return match replayed {
            Some(data) => Ok(Interpreted::Replayed(data)),
            None => {
                tracing::error!(
                    key = cache_key.unwrap_or("-"),
                    "304 Not Modified with no cached entry to replay"
                );
                Err(FetchError::CacheProtocol {
                    key: cache_key.map(String::from),
                })
            }
        };
    }

    if response.is_no_content() {
        let data = serde_json::from_value(Value::Null).map_err(|e| {
            FetchError::InvalidResponseFormat(format!("204 No Content for a non-optional payload: {e}"))
        })?;
        return Ok(Interpreted::Empty(data));
    }

    if !response.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&response.body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| default_message.to_string());
        return Err(FetchError::HttpStatus {
            status: response.status.as_u16(),
            message,
        });
    }

    let data: T = serde_json::from_slice(&response.body)
        .map_err(|e| FetchError::InvalidResponseFormat(e.to_string()))?;

    let validators = response.validators();
    let validated = !validators.is_empty();

    if let Some(key) = cache_key {
        if !validated {
            tracing::warn!(
                key,
                "response carried no ETag or Last-Modified; entry will be re-fetched in full after its TTL \
                 (check Access-Control-Expose-Headers on the origin)"
            );
        }
        store.set(key, CacheEntry::now(data.clone(), validators));
    }

    Ok(Interpreted::Fresh { data, validated })
}
