use crate::constants::{defaults, endpoints, export, models};
use crate::error::ChatmarkError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifies which hosted completion API a session talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Claude,
    #[default]
    OpenAI,
}

impl ProviderId {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Claude => "Claude (Anthropic)",
            Self::OpenAI => "OpenAI",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Claude => endpoints::CLAUDE_BASE_URL,
            Self::OpenAI => endpoints::OPENAI_BASE_URL,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Claude => models::DEFAULT_CLAUDE_MODEL,
            Self::OpenAI => models::DEFAULT_OPENAI_MODEL,
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Self::Claude => "ANTHROPIC_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
        }
    }

    pub fn default_max_tokens(&self) -> Option<u32> {
        match self {
            Self::Claude => Some(defaults::CLAUDE_MAX_TOKENS),
            Self::OpenAI => None,
        }
    }

    /// Transcripts from each provider land in their own directory.
    pub fn default_output_dir(&self) -> &'static str {
        match self {
            Self::Claude => export::CLAUDE_OUTPUT_DIR,
            Self::OpenAI => export::OPENAI_OUTPUT_DIR,
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ProviderId {
    type Err = ChatmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claude" | "anthropic" => Ok(Self::Claude),
            "openai" | "gpt" => Ok(Self::OpenAI),
            other => Err(ChatmarkError::Config(format!(
                "Unknown provider '{other}' (expected claude or openai)"
            ))),
        }
    }
}
