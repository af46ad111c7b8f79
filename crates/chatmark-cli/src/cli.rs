use chatmark_core::{ChatmarkError, ProviderId, Settings};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chatmark")]
#[command(about = "chatmark - chat with a hosted model and keep the transcript as Markdown")]
#[command(version)]
pub struct Cli {
    /// Send a single prompt, print the reply and exit
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Save the transcript after a single prompt
    #[arg(long, requires = "prompt")]
    pub export: bool,

    /// LLM provider (openai, claude)
    #[arg(long)]
    pub provider: Option<String>,

    /// LLM model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature
    #[arg(short, long)]
    pub temperature: Option<f32>,

    /// Upper bound on reply tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// System prompt for the first messages
    #[arg(short, long)]
    pub system: Option<String>,

    /// Session id used in exported file names (random when omitted)
    #[arg(long)]
    pub session_id: Option<String>,

    /// Directory for exported transcripts
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Color theme (dark, light, solarized)
    #[arg(long)]
    pub theme: Option<String>,
}

/// What the surface needs beyond `Settings` to start a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionOptions {
    pub system_prompt: String,
    pub session_id: Option<String>,
}

impl Cli {
    /// Layer the command-line flags over the loaded settings.
    ///
    /// The provider is applied first since switching it resets the model.
    pub fn apply(&self, settings: &mut Settings) -> Result<(), ChatmarkError> {
        if let Some(ref provider) = self.provider {
            settings.set_provider(provider.parse::<ProviderId>()?);
        }
        if let Some(ref model) = self.model {
            settings.llm.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ChatmarkError::Config(format!(
                    "temperature must be between 0 and 2, got {temperature}"
                )));
            }
            settings.llm.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            settings.llm.max_tokens = Some(max_tokens);
        }
        if let Some(ref dir) = self.output_dir {
            settings.export.output_dir = Some(dir.clone());
        }
        if let Some(ref theme) = self.theme {
            settings.ui.theme = theme.clone();
        }
        Ok(())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            system_prompt: self.system.clone().unwrap_or_default(),
            session_id: self.session_id.clone(),
        }
    }
}
