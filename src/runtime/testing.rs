//! Mock implementations for testing
//!
//! These mocks enable turn and router tests without real I/O.

use crate::llm::{CompletionRequest, CompletionResponse, LlmError, LlmService};
use crate::tts::{SpeechSynthesizer, TtsError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock completion client that returns queued responses
#[derive(Default)]
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<CompletionRequest>>,
}

#[allow(dead_code)]
impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful single-choice reply
    pub fn queue_reply(&self, text: &str) {
        self.queue_response(CompletionResponse::from_text(text));
    }

    pub fn queue_response(&self, response: CompletionResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn pending_responses(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmService for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn provider(&self) -> &str {
        "mock"
    }
}

/// Completion client that never answers, for turns abandoned mid-request
pub struct StalledLlmClient;

#[async_trait]
impl LlmService for StalledLlmClient {
    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        std::future::pending().await
    }

    fn provider(&self) -> &str {
        "stalled"
    }
}

// ============================================================================
// Mock Speech Synthesizer
// ============================================================================

/// Mock synthesizer with a fixed result
pub struct MockSynthesizer {
    result: Result<Vec<u8>, TtsError>,
    /// (text, lang) of every call
    pub calls: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl MockSynthesizer {
    pub fn speaking(audio: &[u8]) -> Self {
        Self {
            result: Ok(audio.to_vec()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: TtsError) -> Self {
        Self {
            result: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, TtsError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), lang.to_string()));
        self.result.clone()
    }
}
