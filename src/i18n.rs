//! UI localization
//!
//! Catalogs are flat msgid → msgstr JSON maps embedded from `ui/locale/`.
//! Lookups follow gettext semantics: an untranslated msgid is returned as-is.

use crate::api::Assets;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Every msgid the page renders
pub const UI_MSGIDS: &[&str] = &[
    "Chatbot",
    "Start Your Conversation With Pipiolo:",
    "Send",
    "Clear",
    "Save",
    "To hear the voice please Play",
    "Select Model",
    "Select temperature",
    "Edit Role",
    "You are a kind assistant",
    "Answer concisely",
];

/// Supported UI languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    /// Two-letter code, also used as the speech language
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }

    /// Full language tag
    pub fn tag(self) -> &'static str {
        match self {
            Locale::En => "en_US",
            Locale::Es => "es_ES",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en_us" | "en-us" => Ok(Locale::En),
            "es" | "es_es" | "es-es" => Ok(Locale::Es),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

/// Loaded translation catalog for one locale
#[derive(Debug, Clone, Default)]
pub struct Translations {
    locale: Locale,
    catalog: HashMap<String, String>,
}

impl Translations {
    /// Load the embedded catalog for `locale`
    ///
    /// A missing or unreadable catalog yields identity translations.
    pub fn load(locale: Locale) -> Self {
        let path = format!("locale/{}.json", locale.code());
        let catalog = match Assets::get(&path) {
            Some(file) => serde_json::from_slice(&file.data).unwrap_or_else(|e| {
                tracing::warn!(path = %path, error = %e, "Invalid translation catalog");
                HashMap::new()
            }),
            None => HashMap::new(),
        };
        Self::from_catalog(locale, catalog)
    }

    pub fn from_catalog(locale: Locale, catalog: HashMap<String, String>) -> Self {
        Self { locale, catalog }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn gettext<'a>(&'a self, msgid: &'a str) -> &'a str {
        match self.catalog.get(msgid) {
            Some(msgstr) if !msgstr.is_empty() => msgstr.as_str(),
            _ => msgid,
        }
    }

    /// All UI strings, keyed by msgid
    pub fn ui_strings(&self) -> HashMap<&'static str, String> {
        UI_MSGIDS
            .iter()
            .map(|id| (*id, self.gettext(id).to_string()))
            .collect()
    }
}
