//! Conversation log and the display lists derived from it

use crate::llm::{ChatMessage, Role};

/// Ordered message log plus the prompts and replies shown on the page
///
/// `messages` is the literal history sent to the provider: the system
/// preamble first, then user and assistant turns. `past` and `generated`
/// always have the same length; entry `i` of each forms one displayed
/// exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    messages: Vec<ChatMessage>,
    past: Vec<String>,
    generated: Vec<String>,
    pending_input: String,
}

/// One displayed prompt/reply pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange<'a> {
    pub prompt: &'a str,
    pub reply: &'a str,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user submission
    ///
    /// An empty log is seeded with `preamble` as the system message first.
    pub fn append_user_turn(&mut self, text: &str, preamble: &str) {
        if self.messages.is_empty() {
            self.messages.push(ChatMessage::system(preamble));
        }
        self.messages.push(ChatMessage::user(text));
        self.pending_input = text.to_string();
    }

    /// Append the assistant reply, and show it unless it is empty or
    /// already shown. Returns whether a display entry was added.
    pub fn record_reply(&mut self, text: &str) -> bool {
        self.messages.push(ChatMessage::assistant(text));

        if text.is_empty() || self.generated.iter().any(|g| g == text) {
            return false;
        }
        self.past.push(self.pending_input.clone());
        self.generated.push(text.to_string());
        true
    }

    /// Remove the oldest message after the preamble
    ///
    /// Returns whether anything beyond the preamble is left to send. When
    /// only the preamble remains the pending input is cleared.
    pub fn drop_oldest_exchange(&mut self) -> bool {
        if self.messages.len() > 1 {
            self.messages.remove(1);
        }
        let has_content = self.messages.len() > 1;
        if !has_content {
            self.pending_input.clear();
        }
        has_content
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.past.clear();
        self.generated.clear();
        self.pending_input.clear();
    }

    pub fn clear_pending(&mut self) {
        self.pending_input.clear();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[allow(dead_code)] // Inspected by tests
    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    #[allow(dead_code)] // Inspected by tests
    pub fn past(&self) -> &[String] {
        &self.past
    }

    #[allow(dead_code)] // Inspected by tests
    pub fn generated(&self) -> &[String] {
        &self.generated
    }

    pub fn exchanges(&self) -> impl Iterator<Item = Exchange<'_>> {
        self.past
            .iter()
            .zip(&self.generated)
            .map(|(prompt, reply)| Exchange { prompt, reply })
    }

    /// Messages after the system preamble
    pub fn history(&self) -> &[ChatMessage] {
        match self.messages.first() {
            Some(first) if first.role == Role::System => &self.messages[1..],
            _ => &self.messages,
        }
    }

    /// The downloadable transcript: history as a JSON array
    pub fn transcript_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self.history())
    }
}
