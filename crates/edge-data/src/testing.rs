//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use http::{HeaderMap, HeaderValue, StatusCode};
use parking_lot::Mutex;

use crate::error::FetchError;
use crate::request::FetchRequest;
use crate::response::RawResponse;
use crate::transport::Transport;

enum Step {
    Respond(RawResponse),
    Fail(FetchError),
    Stall(Duration, RawResponse),
}

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<FetchRequest>>,
    completed: AtomicUsize,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, response: RawResponse) -> &Self {
        self.steps.lock().push_back(Step::Respond(response));
        self
    }

    pub(crate) fn fail(&self, error: FetchError) -> &Self {
        self.steps.lock().push_back(Step::Fail(error));
        self
    }

    pub(crate) fn stall(&self, delay: Duration, response: RawResponse) -> &Self {
        self.steps.lock().push_back(Step::Stall(delay, response));
        self
    }

    pub(crate) fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Sends that ran to completion (were not cancelled).
    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: FetchRequest) -> Result<RawResponse, FetchError> {
        self.requests.lock().push(request);
        let step = self.steps.lock().pop_front();
        let result = match step {
            Some(Step::Respond(response)) => Ok(response),
            Some(Step::Fail(error)) => Err(error),
            Some(Step::Stall(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            None => Err(FetchError::Transport("no scripted response left".into())),
        };
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

pub(crate) fn json_response(status: StatusCode, body: &str, headers: &[(&'static str, &str)]) -> RawResponse {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        if let Ok(value) = HeaderValue::from_str(value) {
            map.insert(*name, value);
        }
    }
    RawResponse::new(status, map, body.as_bytes().to_vec())
}

pub(crate) fn not_modified() -> RawResponse {
    RawResponse::new(StatusCode::NOT_MODIFIED, HeaderMap::new(), Vec::new())
}
