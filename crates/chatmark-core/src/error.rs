use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatmarkError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write chat history to {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No API key for {provider}: set the {env_var} environment variable")]
    MissingApiKey { provider: String, env_var: String },

    #[error("Invalid message order: {0}")]
    TurnOrder(String),
}

impl ChatmarkError {
    pub fn export(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Export {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatmarkError>;
