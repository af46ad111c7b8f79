use crate::conversation::{export_markdown, ConversationLog, Exchange, LogMeta, PromptGroup};
use crate::error::Result;
use crate::llm::{LlmClient, Usage};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Token usage accumulated over a session, as reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageTotals {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub request_count: u64,
}

impl UsageTotals {
    pub fn track(&mut self, usage: Option<Usage>) {
        if let Some(u) = usage {
            self.total_input_tokens += u.input_tokens as u64;
            self.total_output_tokens += u.output_tokens as u64;
        }
        self.request_count += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Read-only copy of what a surface needs to draw a session.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub system_prompt: String,
    pub prompt_groups: Vec<PromptGroup>,
    pub usage: UsageTotals,
}

impl SessionSnapshot {
    pub fn exchange_count(&self) -> usize {
        self.prompt_groups.iter().map(|g| g.exchanges.len()).sum()
    }
}

/// One chat: a completion client, the log it feeds, and the settings the
/// surface can change (system prompt, session id).
pub struct ChatSession {
    client: Box<dyn LlmClient>,
    log: ConversationLog,
    session_id: String,
    system_prompt: String,
    output_dir: PathBuf,
    usage: UsageTotals,
}

impl ChatSession {
    /// The log's metadata is taken from the client so the transcript
    /// always names the model that actually answered.
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        let meta = LogMeta::new(client.model(), client.temperature());
        Self {
            client,
            log: ConversationLog::new(meta),
            session_id: generate_session_id(),
            system_prompt: String::new(),
            output_dir: PathBuf::from("."),
            usage: UsageTotals::default(),
        }
    }

    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = id.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn set_session_id(&mut self, id: impl Into<String>) {
        self.session_id = id.into();
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Applies to the next message sent; the log is untouched until then.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn usage(&self) -> UsageTotals {
        self.usage
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Send a message under the active system prompt and record the turn.
    ///
    /// If the completion fails nothing is recorded and the error is
    /// returned unchanged.
    pub async fn send(&mut self, user_message: impl Into<String>) -> Result<String> {
        let user_message = user_message.into();
        let user_time = Local::now();
        let messages = self
            .log
            .completion_messages(&self.system_prompt, &user_message);

        let response = self.client.chat(&messages).await?;
        let bot_time = Local::now();

        self.usage.track(response.usage);
        self.log.record_exchange(
            &self.system_prompt,
            user_message,
            response.content.as_str(),
            user_time,
            bot_time,
        );
        tracing::debug!(
            session = %self.session_id,
            exchanges = self.log.exchange_count(),
            "exchange recorded"
        );

        Ok(response.content)
    }

    /// Write the transcript into the output directory and return its path.
    pub fn export_at(&self, now: DateTime<Local>) -> Result<PathBuf> {
        export_markdown(&self.log, &self.output_dir, &self.session_id, now)
    }

    /// Export with the current time and return a confirmation line.
    pub fn export(&self) -> Result<String> {
        let path = self.export_at(Local::now())?;
        Ok(format!("Chat history saved to {}", path.display()))
    }

    pub fn undo_last_exchange(&mut self) -> Option<Exchange> {
        self.log.undo_last_exchange()
    }

    /// Forget every exchange. Session id and system prompt stay.
    pub fn clear_session(&mut self) {
        self.log.clear_session();
        self.usage.reset();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            system_prompt: self.system_prompt.clone(),
            prompt_groups: self.log.prompt_groups().to_vec(),
            usage: self.usage,
        }
    }
}

pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_session_id() {
        let id1 = generate_session_id();
        let id2 = generate_session_id();

        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36);
        assert!(id1.contains('-'));
    }

    #[test]
    fn test_usage_totals_track() {
        let mut totals = UsageTotals::default();
        totals.track(Some(Usage {
            input_tokens: 10,
            output_tokens: 4,
        }));
        totals.track(None);

        assert_eq!(totals.total_input_tokens, 10);
        assert_eq!(totals.total_output_tokens, 4);
        assert_eq!(totals.request_count, 2);

        totals.reset();
        assert_eq!(totals, UsageTotals::default());
    }
}
