//! Mock LLM backend for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::{LlmBackend, LlmError, LlmRequest, LlmResponse};

/// A configurable mock response for [`MockBackend`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this string as the completion content.
    Content(String),
    /// Fail the call with an API error carrying this message.
    Error(String),
}

/// A hand-rolled mock implementing [`LlmBackend`] for tests.
///
/// Returns responses in order, repeating the last one once the sequence is
/// exhausted, and records every request it receives.
pub struct MockBackend {
    model: String,
    responses: Mutex<Vec<MockResponse>>,
    fallback: MockResponse,
    requests: Mutex<Vec<LlmRequest>>,
    call_count: AtomicUsize,
}

impl MockBackend {
    /// Create a mock that always returns `response`.
    pub fn new(response: MockResponse) -> Self {
        Self::with_sequence(vec![response])
    }

    /// Create a mock that returns `content` as the completion on every call.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self::new(MockResponse::Content(content.into()))
    }

    /// Create a mock that returns responses in order, repeating the last one.
    pub fn with_sequence(mut responses: Vec<MockResponse>) -> Self {
        let fallback = responses
            .last()
            .cloned()
            .unwrap_or_else(|| MockResponse::Error("no mock response configured".to_string()));
        // Reverse so the next response is popped from the back.
        responses.reverse();
        Self {
            model: "mock-model".to_string(),
            responses: Mutex::new(responses),
            fallback,
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn next_response(&self) -> MockResponse {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(req);

        match self.next_response() {
            MockResponse::Content(content) => Ok(LlmResponse {
                content,
                model: self.model.clone(),
                prompt_tokens: 0,
                completion_tokens: 0,
            }),
            MockResponse::Error(message) => Err(LlmError::ApiError { status: 500, message }),
        }
    }

    fn model_id(&self) -> &str { &self.model }
    fn is_local(&self) -> bool { true }
}
