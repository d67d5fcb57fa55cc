//! LLM error types

use serde::Serialize;
use thiserror::Error;

/// Provider error code for a prompt that no longer fits the model
pub const CONTEXT_LENGTH_EXCEEDED: &str = "context_length_exceeded";

/// LLM error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidRequest, message)
    }

    pub fn context_length_exceeded(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ContextLengthExceeded, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::MalformedResponse, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, message)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmErrorKind {
    /// Network issues, timeouts
    Network,
    /// Rate limited (429)
    RateLimit,
    /// Server error (5xx)
    ServerError,
    /// Authentication failed (401, 403)
    Auth,
    /// Bad request (400) other than context overflow
    InvalidRequest,
    /// The message history exceeds the model's input capacity
    ContextLengthExceeded,
    /// Provider answered 2xx but the body is not a usable completion
    MalformedResponse,
    /// Unknown error
    Unknown,
}

impl LlmErrorKind {
    /// The one kind the turn state machine recovers from by truncating history
    pub fn is_context_overflow(self) -> bool {
        matches!(self, Self::ContextLengthExceeded)
    }
}
