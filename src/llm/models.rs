//! The fixed set of selectable chat models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chat models offered in the model picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChatModel {
    #[default]
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "gpt-4")]
    Gpt4,
    #[serde(rename = "gpt-4-32k")]
    Gpt4_32k,
}

impl ChatModel {
    /// Model name sent to the provider
    pub fn api_name(self) -> &'static str {
        match self {
            ChatModel::Gpt35Turbo => "gpt-3.5-turbo",
            ChatModel::Gpt4 => "gpt-4",
            ChatModel::Gpt4_32k => "gpt-4-32k",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ChatModel::Gpt35Turbo => "GPT-3.5 Turbo (fast, inexpensive)",
            ChatModel::Gpt4 => "GPT-4 (more capable)",
            ChatModel::Gpt4_32k => "GPT-4 32K (long context)",
        }
    }

    /// Context window size in tokens
    pub fn context_window(self) -> usize {
        match self {
            ChatModel::Gpt35Turbo => 4_096,
            ChatModel::Gpt4 => 8_192,
            ChatModel::Gpt4_32k => 32_768,
        }
    }
}

/// All models, in picker order
pub fn all_models() -> &'static [ChatModel] {
    &[ChatModel::Gpt35Turbo, ChatModel::Gpt4, ChatModel::Gpt4_32k]
}

impl fmt::Display for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

/// Error for a model name outside the fixed set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model: {0}")]
pub struct UnknownModel(pub String);

impl FromStr for ChatModel {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_models()
            .iter()
            .copied()
            .find(|m| m.api_name() == s.trim())
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}
