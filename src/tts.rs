//! Text-to-speech for assistant replies

mod google;

pub use google::GoogleTts;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Speech synthesis error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TtsError {
    pub kind: TtsErrorKind,
    pub message: String,
}

impl TtsError {
    pub fn new(kind: TtsErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(TtsErrorKind::UnsupportedLanguage, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TtsErrorKind::Network, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsErrorKind {
    /// Nothing speakable in the text
    EmptyText,
    /// Language not offered, or rejected by the provider for this text
    UnsupportedLanguage,
    /// Provider refused the request (403)
    Forbidden,
    /// Provider failure (5xx or unexpected status)
    Upstream,
    /// Connection or timeout
    Network,
}

/// Converts reply text into MP3 audio
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// `lang` is a two-letter language code
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, TtsError>;
}

#[async_trait]
impl<T: SpeechSynthesizer + ?Sized> SpeechSynthesizer for Arc<T> {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, TtsError> {
        (**self).synthesize(text, lang).await
    }
}
