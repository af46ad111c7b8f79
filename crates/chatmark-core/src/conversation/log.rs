use crate::llm::Message;
use chrono::{DateTime, Local};

/// Model settings a log was recorded under. Fixed for the life of the log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogMeta {
    pub temperature: f32,
    pub model_name: String,
}

impl LogMeta {
    pub fn new(model_name: impl Into<String>, temperature: f32) -> Self {
        Self {
            temperature,
            model_name: model_name.into(),
        }
    }
}

/// One user message and the reply it got.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub user_message: String,
    pub user_message_time: DateTime<Local>,
    pub bot_response: String,
    pub bot_response_time: DateTime<Local>,
}

/// A contiguous run of exchanges sent under the same system prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptGroup {
    pub system_prompt: String,
    pub exchanges: Vec<Exchange>,
}

/// Everything said in one chat session, grouped by system prompt.
///
/// Groups are keyed on "differs from the most recent prompt", so switching
/// A -> B -> A yields three groups. Only [`record_exchange`] adds entries;
/// [`undo_last_exchange`] and [`clear_session`] are the only ways to remove them.
///
/// [`record_exchange`]: ConversationLog::record_exchange
/// [`undo_last_exchange`]: ConversationLog::undo_last_exchange
/// [`clear_session`]: ConversationLog::clear_session
#[derive(Debug, Clone)]
pub struct ConversationLog {
    meta: LogMeta,
    prompt_groups: Vec<PromptGroup>,
}

impl ConversationLog {
    pub fn new(meta: LogMeta) -> Self {
        Self {
            meta,
            prompt_groups: Vec::new(),
        }
    }

    pub fn meta(&self) -> &LogMeta {
        &self.meta
    }

    pub fn prompt_groups(&self) -> &[PromptGroup] {
        &self.prompt_groups
    }

    pub fn record_exchange(
        &mut self,
        system_prompt: &str,
        user_message: impl Into<String>,
        bot_response: impl Into<String>,
        user_time: DateTime<Local>,
        bot_time: DateTime<Local>,
    ) {
        let starts_new_group = self
            .prompt_groups
            .last()
            .is_none_or(|group| group.system_prompt != system_prompt);

        if starts_new_group {
            self.prompt_groups.push(PromptGroup {
                system_prompt: system_prompt.to_string(),
                exchanges: Vec::new(),
            });
        }

        let exchange = Exchange {
            user_message: user_message.into(),
            user_message_time: user_time,
            bot_response: bot_response.into(),
            bot_response_time: bot_time,
        };

        if let Some(group) = self.prompt_groups.last_mut() {
            group.exchanges.push(exchange);
        }
    }

    /// Remove the most recent exchange. A group left empty goes with it.
    pub fn undo_last_exchange(&mut self) -> Option<Exchange> {
        let group = self.prompt_groups.last_mut()?;
        let removed = group.exchanges.pop();
        if group.exchanges.is_empty() {
            self.prompt_groups.pop();
        }
        removed
    }

    pub fn clear_session(&mut self) {
        self.prompt_groups.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.prompt_groups.is_empty()
    }

    pub fn exchange_count(&self) -> usize {
        self.prompt_groups.iter().map(|g| g.exchanges.len()).sum()
    }

    /// Every exchange in recording order, across groups.
    pub fn exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.prompt_groups.iter().flat_map(|g| g.exchanges.iter())
    }

    pub fn last_exchange(&self) -> Option<&Exchange> {
        self.prompt_groups.last()?.exchanges.last()
    }

    /// Build the request for the next turn: the active system prompt, the
    /// whole recorded history as user/assistant pairs, then the new message.
    pub fn completion_messages(&self, system_prompt: &str, next_user_message: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.exchange_count() * 2 + 2);
        messages.push(Message::system(system_prompt));
        for exchange in self.exchanges() {
            messages.push(Message::user(exchange.user_message.as_str()));
            messages.push(Message::assistant(exchange.bot_response.as_str()));
        }
        messages.push(Message::user(next_user_message));
        messages
    }
}
