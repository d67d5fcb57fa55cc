//! Server configuration from the environment

use crate::llm::ChatModel;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TTS_BASE_URL: &str = "https://translate.google.com";
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(300);
pub const TTS_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for {var}: {message}")]
pub struct ConfigError {
    pub var: &'static str,
    pub message: String,
}

impl ConfigError {
    fn new(var: &'static str, message: impl Into<String>) -> Self {
        Self {
            var,
            message: message.into(),
        }
    }
}

/// Everything `main` needs to wire the server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Missing key is allowed; completion calls then fail with an auth error
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub default_model: ChatModel,
    pub llm_timeout: Duration,
    pub tts_base_url: String,
    pub session_idle: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let port = match get("CHATBOT_PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::new("CHATBOT_PORT", e.to_string()))?,
            None => DEFAULT_PORT,
        };

        let default_model = match get("DEFAULT_MODEL") {
            Some(v) => v
                .parse::<ChatModel>()
                .map_err(|e| ConfigError::new("DEFAULT_MODEL", e.to_string()))?,
            None => ChatModel::default(),
        };

        Ok(Self {
            port,
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: url_var(
                get("OPENAI_BASE_URL"),
                "OPENAI_BASE_URL",
                DEFAULT_OPENAI_BASE_URL,
            )?,
            default_model,
            llm_timeout: secs_var(
                get("LLM_TIMEOUT_SECS"),
                "LLM_TIMEOUT_SECS",
                DEFAULT_LLM_TIMEOUT,
            )?,
            tts_base_url: url_var(get("TTS_BASE_URL"), "TTS_BASE_URL", DEFAULT_TTS_BASE_URL)?,
            session_idle: secs_var(
                get("SESSION_IDLE_SECS"),
                "SESSION_IDLE_SECS",
                DEFAULT_SESSION_IDLE,
            )?,
        })
    }
}

fn secs_var(
    value: Option<String>,
    var: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::new(var, "must be greater than zero")),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::new(var, e.to_string())),
    }
}

fn url_var(value: Option<String>, var: &'static str, default: &str) -> Result<String, ConfigError> {
    let value = value.unwrap_or_else(|| default.to_string());
    let url = reqwest::Url::parse(value.trim()).map_err(|e| ConfigError::new(var, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::new(var, "must be an http(s) URL"));
    }
    Ok(value.trim().trim_end_matches('/').to_string())
}
