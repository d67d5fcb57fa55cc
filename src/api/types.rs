//! API request and response types

use crate::i18n::Locale;
use crate::llm::ChatModel;
use crate::runtime::TurnOutcome;
use crate::session::ChatSession;
use crate::state_machine::TurnState;
use base64::Engine;
use pulldown_cmark::{html, Event, Options, Parser};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Settings as shown in the sidebar
#[derive(Debug, Serialize)]
pub struct SettingsView {
    pub model: ChatModel,
    pub temperature: f32,
    /// Effective role, localized default when unset
    pub role: String,
    pub locale: Locale,
}

/// One prompt and its reply
#[derive(Debug, Serialize)]
pub struct ExchangeView {
    pub prompt: String,
    pub reply: String,
    pub reply_html: String,
}

/// Everything the page needs to render a session
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub settings: SettingsView,
    pub exchanges: Vec<ExchangeView>,
    pub strings: HashMap<&'static str, String>,
    pub state: TurnState,
}

impl SessionView {
    pub fn from_session(session: &ChatSession) -> Self {
        let translations = session.translations();
        Self {
            settings: SettingsView {
                model: session.settings.model,
                temperature: session.settings.temperature,
                role: session.settings.role_text(translations).to_string(),
                locale: session.settings.locale,
            },
            exchanges: session
                .conversation
                .exchanges()
                .map(|e| ExchangeView {
                    prompt: e.prompt.to_string(),
                    reply: e.reply.to_string(),
                    reply_html: render_markdown(e.reply),
                })
                .collect(),
            strings: translations.ui_strings(),
            state: session.state.clone(),
        }
    }
}

/// Response for a chat turn
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// MP3, base64 encoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_error: Option<String>,
    pub retries: u32,
    pub session: SessionView,
}

impl TurnResponse {
    pub fn new(outcome: TurnOutcome, session: &ChatSession) -> Self {
        Self {
            reply: outcome.reply,
            error: outcome.error,
            audio_base64: outcome
                .audio
                .map(|audio| base64::engine::general_purpose::STANDARD.encode(audio)),
            audio_error: outcome.audio_error,
            retries: outcome.retries,
            session: SessionView::from_session(session),
        }
    }
}

/// Model information with metadata
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: ChatModel,
    pub description: &'static str,
    pub context_window: usize,
}

/// Response for model list
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: ChatModel,
}

/// Translated UI strings for one locale
#[derive(Debug, Serialize)]
pub struct I18nResponse {
    pub locale: Locale,
    pub strings: HashMap<&'static str, String>,
}

/// Response for ending a session
#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub ended: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Render a reply to HTML; raw HTML in the reply is shown as text
pub fn render_markdown(text: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
