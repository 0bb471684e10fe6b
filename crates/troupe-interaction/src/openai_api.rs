//! OpenAiApiBackend - chat-completions backend for OpenAI-compatible APIs.
//!
//! Works against the official endpoint or any compatible provider by
//! overriding the base URL. Configuration comes from environment variables
//! (`OPENAI_API_KEY`, `OPENAI_MODEL_NAME`, `OPENAI_BASE_URL`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use troupe_core::backend::{AiBackend, Generation};
use troupe_core::{Result, TroupeError};

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Backend implementation that talks to an OpenAI-compatible HTTP API.
#[derive(Clone)]
pub struct OpenAiApiBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    system: Option<String>,
}

impl OpenAiApiBackend {
    /// Creates a new backend with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            system: None,
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// Requires `OPENAI_API_KEY`; model and base URL fall back to the
    /// official defaults unless `OPENAI_MODEL_NAME` / `OPENAI_BASE_URL`
    /// are set.
    pub fn try_from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| TroupeError::config("OPENAI_API_KEY not found in environment variables"))?;
        let model = env::var("OPENAI_MODEL_NAME").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.into());
        let mut backend = Self::new(api_key, model);
        if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
            backend = backend.with_base_url(base_url);
        }
        Ok(backend)
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Points the backend at a compatible provider's endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Adds a system prompt that will be sent alongside every request.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    fn build_request(&self, prompt: &str) -> ChatRequest {
        let mut messages = Vec::new();
        if let Some(system) = &self.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });
        ChatRequest {
            model: self.model.clone(),
            messages,
        }
    }
}

#[async_trait]
impl AiBackend for OpenAiApiBackend {
    fn name(&self) -> &str {
        "openai-api"
    }

    async fn generate(&self, prompt: &str) -> Result<Generation> {
        let request = self.build_request(prompt);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| TroupeError::generation(format!("OpenAI API request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TroupeError::generation(format!(
                "OpenAI API returned {status}: {body}"
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|err| {
            TroupeError::generation(format!("OpenAI API response was not valid JSON: {err}"))
        })?;
        extract_text(body)
    }
}

/// Pulls the first choice's message content out of a chat response.
fn extract_text(response: ChatResponse) -> Result<Generation> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .map(Generation::new)
        .ok_or_else(|| TroupeError::generation("OpenAI API response contained no choices"))
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}
