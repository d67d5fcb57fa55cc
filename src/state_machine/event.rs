//! Events that drive a turn

use crate::llm::LlmError;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserSubmit { text: String },

    // Conversation bookkeeping
    TurnRecorded,
    ExchangeDropped {
        /// Messages beyond the preamble remain
        has_content: bool,
    },

    // Provider events
    CompletionSucceeded { reply: String },
    CompletionFailed { error: LlmError },
}
