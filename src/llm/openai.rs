// src/llm/openai.rs

//! Chat completions client for OpenAI-compatible endpoints.
//! One request per analysis, no streaming.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::llm::OpenAIConfig;
use crate::error::{AnalyzerError, Result};
use crate::llm::{ChatMessage, TextGenerator};

#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client,
    config: OpenAIConfig,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAIClient {
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAIClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: &messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(model = %self.config.model, "Sending chat completion request");

        let response = self
            .client
            .post(self.config.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::Api { status, body });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(AnalyzerError::EmptyResponse)
    }
}
