use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::defaults;
use crate::error::ChatmarkError;
use crate::llm::{ClaudeClient, LlmClient, OpenAIClient, ProviderId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub ui: UiSettings,
}

/// Keys left out of `[llm]` take the chosen provider's defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PartialLlmSettings")]
pub struct LlmSettings {
    pub provider: ProviderId,
    pub model: String,
    pub temperature: f32,
    /// Falls back to the provider default when unset.
    pub max_tokens: Option<u32>,
    pub api_key_env: String,
    pub base_url: Option<String>,
}

/// `[llm]` as written on disk, before provider defaults are filled in.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialLlmSettings {
    provider: Option<ProviderId>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    api_key_env: Option<String>,
    base_url: Option<String>,
}

impl From<PartialLlmSettings> for LlmSettings {
    fn from(partial: PartialLlmSettings) -> Self {
        let mut llm = LlmSettings::for_provider(partial.provider.unwrap_or_default());
        if let Some(model) = partial.model {
            llm.model = model;
        }
        if let Some(temperature) = partial.temperature {
            llm.temperature = temperature;
        }
        if let Some(api_key_env) = partial.api_key_env {
            llm.api_key_env = api_key_env;
        }
        llm.max_tokens = partial.max_tokens;
        llm.base_url = partial.base_url;
        llm
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Falls back to the provider's output directory when unset.
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    pub theme: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            theme: defaults::THEME.to_string(),
        }
    }
}

impl LlmSettings {
    pub fn for_provider(provider: ProviderId) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            temperature: defaults::TEMPERATURE,
            max_tokens: None,
            api_key_env: provider.default_api_key_env().to_string(),
            base_url: None,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self::for_provider(ProviderId::default())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm: LlmSettings::default(),
            export: ExportSettings::default(),
            ui: UiSettings::default(),
        }
    }
}

impl Settings {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chatmark")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Missing or unreadable files give the defaults.
    pub fn load_from(path: &std::path::Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Ignoring invalid config {}: {e}", path.display()),
                },
                Err(e) => tracing::warn!("Could not read config {}: {e}", path.display()),
            }
        }
        Self::default()
    }

    pub fn save(&self) -> Result<(), ChatmarkError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ChatmarkError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ChatmarkError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Switch provider, resetting the provider-specific fields to its defaults.
    pub fn set_provider(&mut self, provider: ProviderId) {
        if self.llm.provider != provider {
            let temperature = self.llm.temperature;
            self.llm = LlmSettings::for_provider(provider);
            self.llm.temperature = temperature;
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.llm.provider.default_output_dir()))
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.llm
            .max_tokens
            .or_else(|| self.llm.provider.default_max_tokens())
    }

    /// Get the API key from the environment variable specified in settings.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    /// Build an LLM client from the current settings.
    pub fn build_llm_client(&self) -> Result<Box<dyn LlmClient>, ChatmarkError> {
        let provider = self.llm.provider;
        let api_key = self.api_key().ok_or_else(|| ChatmarkError::MissingApiKey {
            provider: provider.name().to_string(),
            env_var: self.llm.api_key_env.clone(),
        })?;
        let base_url = self
            .llm
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string());

        let client: Box<dyn LlmClient> = match provider {
            ProviderId::Claude => {
                let mut client = ClaudeClient::new(api_key)
                    .with_model(&self.llm.model)
                    .with_base_url(base_url)
                    .with_temperature(self.llm.temperature);
                if let Some(max) = self.max_tokens() {
                    client = client.with_max_tokens(max);
                }
                Box::new(client)
            }
            ProviderId::OpenAI => Box::new(
                OpenAIClient::new(api_key)
                    .with_model(&self.llm.model)
                    .with_base_url(base_url)
                    .with_max_tokens(self.max_tokens())
                    .with_temperature(self.llm.temperature),
            ),
        };

        tracing::debug!(provider = %provider, model = %self.llm.model, "LLM client ready");
        Ok(client)
    }
}
