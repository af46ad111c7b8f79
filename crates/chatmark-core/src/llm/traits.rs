use crate::error::{ChatmarkError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A hosted completion endpoint.
///
/// `messages` must satisfy [`validate_turn_order`]: any number of leading
/// system messages, then user and assistant turns alternating, starting and
/// ending with a user turn. Implementations check this before sending.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the conversation and return the full reply.
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse>;

    fn model(&self) -> &str;

    fn temperature(&self) -> f32;
}

pub fn validate_turn_order(messages: &[Message]) -> Result<()> {
    let leading_system = messages
        .iter()
        .take_while(|m| m.role == Role::System)
        .count();
    let turns = &messages[leading_system..];

    if turns.is_empty() {
        return Err(ChatmarkError::TurnOrder(
            "no user message to answer".to_string(),
        ));
    }

    for (i, message) in turns.iter().enumerate() {
        let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
        if message.role != expected {
            return Err(ChatmarkError::TurnOrder(format!(
                "message {} is {:?}, expected {:?}",
                leading_system + i,
                message.role,
                expected
            )));
        }
    }

    if turns.len() % 2 == 0 {
        return Err(ChatmarkError::TurnOrder(
            "conversation must end with a user message".to_string(),
        ));
    }

    Ok(())
}
