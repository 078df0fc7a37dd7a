// src/config/llm.rs
// Chat completions endpoint configuration

use std::fmt;
use std::time::Duration;

use crate::error::{AnalyzerError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 10_000;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

#[derive(Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// No request timeout when `None`
    pub timeout: Option<Duration>,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(AnalyzerError::Config("OPENAI_API_KEY is required".to_string()));
        }

        if self.model.trim().is_empty() {
            return Err(AnalyzerError::Config("model name must not be empty".to_string()));
        }

        if self.max_tokens == 0 {
            return Err(AnalyzerError::Config("max tokens must be positive".to_string()));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AnalyzerError::Config(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        url::Url::parse(&self.base_url).map_err(|e| {
            AnalyzerError::Config(format!("invalid base URL '{}': {}", self.base_url, e))
        })?;

        Ok(())
    }

    /// Full URL of an endpoint below the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}
