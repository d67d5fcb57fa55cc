//! Google Translate TTS endpoint client
//!
//! The endpoint speaks at most 100 characters per request, so replies are
//! split on word boundaries and the MP3 segments are concatenated.

use super::{SpeechSynthesizer, TtsError, TtsErrorKind};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;

/// Longest text the endpoint accepts in one request
pub const MAX_CHUNK_CHARS: usize = 100;

/// Languages the endpoint is asked to speak
const SUPPORTED_LANGS: &[&str] = &[
    "ar", "ca", "cs", "da", "de", "el", "en", "es", "fi", "fr", "hi", "hu", "id", "it", "ja",
    "ko", "nl", "no", "pl", "pt", "ro", "ru", "sk", "sv", "th", "tr", "uk", "vi", "zh",
];

pub struct GoogleTts {
    client: Client,
    base_url: String,
}

impl GoogleTts {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TtsError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chunk_url(
        &self,
        chunk: &str,
        lang: &str,
        idx: usize,
        total: usize,
    ) -> Result<Url, TtsError> {
        let total = total.to_string();
        let idx = idx.to_string();
        let textlen = chunk.chars().count().to_string();
        Url::parse_with_params(
            &format!("{}/translate_tts", self.base_url),
            &[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", lang),
                ("client", "tw-ob"),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ],
        )
        .map_err(|e| TtsError::new(TtsErrorKind::Upstream, format!("Invalid TTS URL: {e}")))
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, TtsError> {
        if !SUPPORTED_LANGS.contains(&lang) {
            return Err(TtsError::unsupported(format!("Language not supported: {lang}")));
        }

        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(TtsError::new(TtsErrorKind::EmptyText, "No text to speak"));
        }

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let url = self.chunk_url(chunk, lang, idx, chunks.len())?;
            let response = self.client.get(url).send().await.map_err(|e| {
                if e.is_timeout() {
                    TtsError::network(format!("Request timeout: {e}"))
                } else {
                    TtsError::network(format!("Connection failed: {e}"))
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(classify_status(status, lang));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| TtsError::network(format!("Failed to read audio: {e}")))?;
            audio.extend_from_slice(&bytes);
        }

        tracing::debug!(
            lang = %lang,
            chunks = chunks.len(),
            bytes = audio.len(),
            "Synthesized speech"
        );
        Ok(audio)
    }
}

fn classify_status(status: StatusCode, lang: &str) -> TtsError {
    match status.as_u16() {
        400 | 404 => TtsError::unsupported(format!(
            "{status}: unsupported text or language ({lang})"
        )),
        403 => TtsError::new(
            TtsErrorKind::Forbidden,
            format!("{status}: bad token or upstream API changes"),
        ),
        _ => TtsError::new(TtsErrorKind::Upstream, format!("{status}: upstream API error")),
    }
}

/// Split `text` into chunks of at most `max_chars` characters
///
/// Words are kept whole unless a single word is longer than `max_chars`.
/// Chunks with nothing speakable (only punctuation) are dropped.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            chunks.extend(chars.chunks(max_chars).map(|piece| piece.iter().collect::<String>()));
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks.retain(|c| c.chars().any(char::is_alphanumeric));
    chunks
}
