//! Scripted text generator for tests and offline runs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{GenerationRequest, TextGenerator};

/// Mock response configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum MockResponse {
    Text(String),
    Failure(String),
}

impl MockResponse {
    pub fn success(output: impl Into<String>) -> Self {
        Self::Text(output.into())
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure(error.into())
    }
}

/// Replays queued responses in order, then falls back to a default.
pub struct MockTextGenerator {
    queue: Mutex<VecDeque<MockResponse>>,
    default_response: MockResponse,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self::with_default_response(MockResponse::success("그 장면이 정말 인상 깊었구나"))
    }

    pub fn with_default_response(response: MockResponse) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            default_response: response,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Generator whose every call fails.
    pub fn failing(error: impl Into<String>) -> Self {
        Self::with_default_response(MockResponse::failure(error))
    }

    pub fn push_response(&self, response: MockResponse) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(response);
        }
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Default for MockTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, request: &GenerationRequest) -> DomainResult<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let next = self
            .queue
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| self.default_response.clone());

        match next {
            MockResponse::Text(text) => Ok(text),
            MockResponse::Failure(message) => Err(DomainError::ExecutionFailed(message)),
        }
    }
}
