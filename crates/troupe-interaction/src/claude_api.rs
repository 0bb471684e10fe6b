//! ClaudeApiBackend - Direct REST API implementation for Claude.
//!
//! This backend calls the Claude REST API directly without CLI dependency.
//! Configuration comes from environment variables (`ANTHROPIC_API_KEY`,
//! `CLAUDE_MODEL_NAME`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use troupe_core::backend::{AiBackend, Generation};
use troupe_core::{Result, TroupeError};

const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Backend implementation that talks to the Claude HTTP API.
#[derive(Clone)]
pub struct ClaudeApiBackend {
    client: Client,
    api_key: String,
    model: String,
    system: Option<String>,
    max_tokens: u32,
}

impl ClaudeApiBackend {
    /// Creates a new backend with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            system: None,
            max_tokens: 4096,
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// Requires `ANTHROPIC_API_KEY`; the model defaults to
    /// `claude-sonnet-4-20250514` unless `CLAUDE_MODEL_NAME` is set.
    pub fn try_from_env() -> Result<Self> {
        let api_key = env::var("ANTHROPIC_API_KEY").map_err(|_| {
            TroupeError::config("ANTHROPIC_API_KEY not found in environment variables")
        })?;
        let model = env::var("CLAUDE_MODEL_NAME").unwrap_or_else(|_| DEFAULT_CLAUDE_MODEL.into());
        Ok(Self::new(api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Adds a system prompt that will be sent alongside every request.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn build_request(&self, prompt: &str) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: self.system.clone(),
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        }
    }
}

#[async_trait]
impl AiBackend for ClaudeApiBackend {
    fn name(&self) -> &str {
        "claude-api"
    }

    async fn generate(&self, prompt: &str) -> Result<Generation> {
        let request = self.build_request(prompt);

        let response = self
            .client
            .post(BASE_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|err| TroupeError::generation(format!("Claude API request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TroupeError::generation(format!(
                "Claude API returned {status}: {body}"
            )));
        }

        let body: MessagesResponse = response.json().await.map_err(|err| {
            TroupeError::generation(format!("Claude API response was not valid JSON: {err}"))
        })?;
        extract_text(body)
    }
}

/// Pulls the first text block out of a messages response.
fn extract_text(response: MessagesResponse) -> Result<Generation> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .filter(|text| !text.is_empty())
        .map(Generation::new)
        .ok_or_else(|| TroupeError::generation("Claude API response contained no text content"))
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ApiMessage>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let backend = ClaudeApiBackend::new("key", "claude-sonnet-4-20250514")
            .with_system("You are Tester.")
            .with_max_tokens(512);

        let request = backend.build_request("run the suite");
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["model"], "claude-sonnet-4-20250514");
        assert_eq!(encoded["max_tokens"], 512);
        assert_eq!(encoded["system"], "You are Tester.");
        assert_eq!(encoded["messages"][0]["role"], "user");
        assert_eq!(encoded["messages"][0]["content"], "run the suite");
    }

    #[test]
    fn test_extract_text_takes_first_text_block() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "content": [
                {"type": "tool_use", "id": "t1", "name": "x", "input": {}},
                {"type": "text", "text": "all green"}
            ]
        }))
        .unwrap();

        let generation = extract_text(response).unwrap();
        assert_eq!(generation.text, "all green");
    }

    #[test]
    fn test_extract_text_rejects_empty_content() {
        let response: MessagesResponse = serde_json::from_value(json!({"content": []})).unwrap();
        let err = extract_text(response).unwrap_err();
        assert!(err.is_generation());
    }
}
