use crate::constants::{defaults, endpoints, models};
use crate::error::{ChatmarkError, Result};
use crate::llm::traits::*;
use serde::Deserialize;
use serde_json::Value;

pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
}

impl ClaudeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: models::DEFAULT_CLAUDE_MODEL.to_string(),
            base_url: endpoints::CLAUDE_BASE_URL.to_string(),
            max_tokens: defaults::CLAUDE_MAX_TOKENS,
            temperature: defaults::TEMPERATURE,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn build_request_body(&self, messages: &[Message]) -> Value {
        // The messages API takes the system prompt as a top-level field
        let system_prompt: String = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let conv_messages: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                serde_json::json!({
                    "role": m.role,
                    "content": m.content,
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": conv_messages,
        });

        if !system_prompt.is_empty() {
            body["system"] = Value::String(system_prompt);
        }

        body
    }
}

#[derive(Debug, Deserialize)]
struct ClaudeApiResponse {
    content: Vec<ClaudeContent>,
    usage: Option<ClaudeUsage>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeUsage {
    input_tokens: u32,
    output_tokens: u32,
}

fn parse_response(response_text: &str) -> Result<LlmResponse> {
    let api_response: ClaudeApiResponse = serde_json::from_str(response_text)
        .map_err(|e| ChatmarkError::Llm(format!("Failed to parse response: {e}")))?;

    let content = api_response
        .content
        .iter()
        .find(|c| c.content_type == "text")
        .map(|c| c.text.clone())
        .ok_or_else(|| ChatmarkError::Llm("No text content in response".into()))?;

    Ok(LlmResponse {
        content,
        usage: api_response.usage.map(|u| Usage {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
        }),
    })
}

#[async_trait::async_trait]
impl LlmClient for ClaudeClient {
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse> {
        validate_turn_order(messages)?;

        let url = format!("{}/v1/messages", self.base_url);
        let request_body = self.build_request_body(messages);
        tracing::debug!(
            model = %self.model,
            messages = messages.len(),
            "sending Claude messages request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", endpoints::ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(ChatmarkError::Llm(format!(
                "Claude API error ({}): {}",
                status, response_text
            )));
        }

        parse_response(&response_text)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }
}
