//! Per-browser chat sessions
//!
//! A `ChatSession` is created when a browser first loads the page, handed to
//! every handler through the `SessionStore`, and dropped when the session
//! ends or goes idle.

mod conversation;
mod store;

pub use conversation::ConversationState;
pub use store::{try_acquire, SessionError, SessionStore};

use crate::i18n::{Locale, Translations};
use crate::llm::ChatModel;
use crate::state_machine::TurnState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings chosen on the page, read by the completion and speech calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub model: ChatModel,
    pub temperature: f32,
    /// Persona text; `None` means the localized default role
    pub role: Option<String>,
    pub locale: Locale,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            model: ChatModel::default(),
            temperature: 0.0,
            role: None,
            locale: Locale::default(),
        }
    }
}

/// Partial update from the settings form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub role: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("unknown model: {0}")]
    UnknownModel(String),
    #[error("temperature must be between 0.0 and 1.0, got {0}")]
    TemperatureOutOfRange(f32),
    #[error("unsupported locale: {0}")]
    UnknownLocale(String),
}

impl SessionSettings {
    pub fn with_model(model: ChatModel) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    /// Validate and apply `update`; on error nothing is changed
    pub fn apply(&mut self, update: SettingsUpdate) -> Result<(), SettingsError> {
        let model = match update.model {
            Some(name) => name
                .parse::<ChatModel>()
                .map_err(|_| SettingsError::UnknownModel(name))?,
            None => self.model,
        };
        let temperature = match update.temperature {
            Some(t) if (0.0..=1.0).contains(&t) => t,
            Some(t) => return Err(SettingsError::TemperatureOutOfRange(t)),
            None => self.temperature,
        };
        let locale = match update.locale {
            Some(code) => code
                .parse::<Locale>()
                .map_err(|_| SettingsError::UnknownLocale(code))?,
            None => self.locale,
        };

        self.model = model;
        self.temperature = temperature;
        self.locale = locale;
        if let Some(role) = update.role {
            let role = role.trim();
            self.role = if role.is_empty() {
                None
            } else {
                Some(role.to_string())
            };
        }
        Ok(())
    }

    /// Role text shown in the form
    pub fn role_text<'a>(&'a self, translations: &'a Translations) -> &'a str {
        self.role
            .as_deref()
            .unwrap_or_else(|| translations.gettext("You are a kind assistant"))
    }

    /// System message that opens every conversation
    pub fn preamble(&self, translations: &Translations) -> String {
        format!(
            "{}. {}",
            self.role_text(translations),
            translations.gettext("Answer concisely")
        )
    }
}

/// Everything one browser session owns
#[derive(Debug, Default)]
pub struct ChatSession {
    pub settings: SessionSettings,
    pub conversation: ConversationState,
    pub state: TurnState,
    translations: Translations,
}

impl ChatSession {
    pub fn new(settings: SessionSettings) -> Self {
        let translations = Translations::load(settings.locale);
        Self {
            settings,
            conversation: ConversationState::new(),
            state: TurnState::Idle,
            translations,
        }
    }

    /// Apply a settings update, reloading translations on a locale change
    pub fn update_settings(&mut self, update: SettingsUpdate) -> Result<(), SettingsError> {
        self.settings.apply(update)?;
        if self.translations.locale() != self.settings.locale {
            tracing::info!(locale = %self.settings.locale, "Locale changed");
            self.translations = Translations::load(self.settings.locale);
        }
        Ok(())
    }

    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    pub fn preamble(&self) -> String {
        self.settings.preamble(&self.translations)
    }

    /// "Clear" button: forget the conversation, keep settings
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.state = TurnState::Idle;
    }
}
