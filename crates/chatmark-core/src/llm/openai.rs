use crate::constants::{defaults, endpoints, models};
use crate::error::{ChatmarkError, Result};
use crate::llm::traits::*;
use serde::{Deserialize, Serialize};

pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: Option<u32>,
    temperature: f32,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: models::DEFAULT_OPENAI_MODEL.to_string(),
            base_url: endpoints::OPENAI_BASE_URL.to_string(),
            max_tokens: None,
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

    pub fn with_max_tokens(mut self, max: Option<u32>) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn build_request<'a>(&'a self, messages: &'a [Message]) -> OpenAIRequest<'a> {
        OpenAIRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

fn parse_response(response_text: &str) -> Result<LlmResponse> {
    let api_response: OpenAIResponse = serde_json::from_str(response_text)
        .map_err(|e| ChatmarkError::Llm(format!("Failed to parse response: {e}")))?;

    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ChatmarkError::Llm("No choices in response".into()))?;

    let content = choice
        .message
        .content
        .ok_or_else(|| ChatmarkError::Llm("No content in response".into()))?;

    Ok(LlmResponse {
        content,
        usage: api_response.usage.map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        }),
    })
}

#[async_trait::async_trait]
impl LlmClient for OpenAIClient {
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse> {
        validate_turn_order(messages)?;

        let url = format!("{}/v1/chat/completions", self.base_url);
        let request_body = self.build_request(messages);
        tracing::debug!(
            model = %self.model,
            messages = messages.len(),
            "sending OpenAI chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(ChatmarkError::Llm(format!(
                "OpenAI API error ({}): {}",
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_keeps_system_message_inline() {
        let client = OpenAIClient::new("key").with_model("gpt-4o-mini");
        let messages = vec![Message::system("You are helpful."), Message::user("Hi")];
        let body = serde_json::to_value(client.build_request(&messages)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["temperature"], 0.0);
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are helpful.");
        assert_eq!(body["messages"][1]["role"], "user");
    }

    #[test]
    fn test_request_includes_max_tokens_when_set() {
        let client = OpenAIClient::new("key").with_max_tokens(Some(256));
        let messages = vec![Message::user("Hi")];
        let body = serde_json::to_value(client.build_request(&messages)).unwrap();
        assert_eq!(body["max_tokens"], 256);
    }

    #[test]
    fn test_parse_response_reads_first_choice() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Hello!"}}],
            "usage": {"prompt_tokens": 9, "completion_tokens": 2, "total_tokens": 11}
        }"#;
        let response = parse_response(raw).unwrap();
        assert_eq!(response.content, "Hello!");
        assert_eq!(response.usage.unwrap().input_tokens, 9);
    }

    #[test]
    fn test_parse_response_without_choices_is_an_error() {
        let err = parse_response(r#"{"choices": []}"#).unwrap_err();
        assert!(err.to_string().contains("No choices"));
    }

    #[test]
    fn test_parse_response_with_null_content_is_an_error() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "length"}]
        }"#;
        let err = parse_response(raw).unwrap_err();
        assert!(err.to_string().contains("No content"));
    }
}
