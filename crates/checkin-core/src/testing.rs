//! Fakes for exercising the conversation client without real I/O.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::Delay;
use crate::error::ExchangeError;
use crate::protocol::RawResponse;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// Transport that replays queued responses and records every request.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<RawResponse, ExchangeError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_response(&self, response: RawResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn queue_error(&self, error: ExchangeError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, request: RecordedRequest) -> Result<RawResponse, ExchangeError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ExchangeError::Transport("no fake response queued".to_string())))
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, path: &str) -> Result<RawResponse, ExchangeError> {
        self.next(RecordedRequest {
            method: "GET",
            path: path.to_string(),
            body: None,
        })
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<RawResponse, ExchangeError> {
        self.next(RecordedRequest {
            method: "POST",
            path: path.to_string(),
            body: Some(body.clone()),
        })
    }
}

/// Delay that returns immediately and remembers what it was asked to wait.
#[derive(Default)]
pub struct RecordingDelay {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
