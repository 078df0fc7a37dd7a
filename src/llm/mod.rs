// src/llm/mod.rs
// Text generation interface used by the analysis engine

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod openai;
pub mod prompt;

pub use openai::OpenAIClient;
pub use prompt::PromptTemplate;

/// Role-tagged chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A synchronous text generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Generate a reply to `messages`. Any failure (transport, quota,
    /// malformed or empty response) is an error, never text.
    async fn generate(&self, messages: Vec<ChatMessage>) -> Result<String>;
}
