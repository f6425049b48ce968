//! OpenAI chat-completions adapter.
//!
//! Calls `POST {base_url}/chat/completions` with a system and a user message.
//! Compatible with any OpenAI-compatible endpoint (Azure OpenAI, local servers).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::LlmConfig;
use crate::domain::ports::{GenerationRequest, TextGenerator};
use crate::infrastructure::logging::SecretScrubber;

/// Configuration for the chat-completions client.
#[derive(Debug, Clone)]
pub struct OpenAiChatConfig {
    /// API key. Falls back to `OPENAI_API_KEY` env var.
    pub api_key: Option<String>,
    /// Base URL for the API. Default: `https://api.openai.com/v1`.
    pub base_url: String,
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OpenAiChatConfig {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for OpenAiChatConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

impl OpenAiChatConfig {
    /// Configured key, else `OPENAI_API_KEY`; empty values count as unset.
    pub fn resolve_api_key(&self) -> DomainResult<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                DomainError::ExecutionFailed(
                    "OpenAI API key not set. Set OPENAI_API_KEY env var or configure llm.api_key."
                        .to_string(),
                )
            })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Text generator backed by the chat-completions endpoint.
pub struct OpenAiChatGenerator {
    config: OpenAiChatConfig,
    api_key: String,
    client: Client,
    scrubber: SecretScrubber,
}

impl OpenAiChatGenerator {
    /// Fails when no API key is available, so a server never starts with
    /// mirroring that can only ever fall back.
    pub fn new(config: OpenAiChatConfig) -> DomainResult<Self> {
        let api_key = config.resolve_api_key()?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::ValidationFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            api_key,
            client,
            scrubber: SecretScrubber::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiChatGenerator {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, request: &GenerationRequest) -> DomainResult<String> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: &request.system_prompt },
                ChatMessage { role: "user", content: &request.user_prompt },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::ExecutionFailed(format!("Chat completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(DomainError::ExecutionFailed(format!(
                "Chat completion API returned {}: {}",
                status,
                self.scrubber.scrub_message(&text)
            )));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            DomainError::SerializationError(format!("Failed to parse chat completion: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| DomainError::ExecutionFailed("Empty chat completion".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_llm_config_trims_base_url() {
        let llm = LlmConfig {
            base_url: "http://localhost:9000/v1/".to_string(),
            ..LlmConfig::default()
        };
        let config = OpenAiChatConfig::from(&llm);
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.model, "gpt-4-1106-preview");
    }

    #[test]
    fn test_request_serialization() {
        let body = ChatCompletionRequest {
            model: "m",
            messages: vec![ChatMessage { role: "system", content: "s" }],
            temperature: 0.0,
            max_tokens: 30,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["max_tokens"], 30);
    }

    #[test]
    fn test_missing_api_key_fails_construction() {
        temp_env::with_var_unset("OPENAI_API_KEY", || {
            let result = OpenAiChatGenerator::new(OpenAiChatConfig::default());
            assert!(matches!(result, Err(DomainError::ExecutionFailed(_))));

            let blank = OpenAiChatConfig::default().with_api_key("");
            assert!(OpenAiChatGenerator::new(blank).is_err());
        });
    }

    #[test]
    fn test_api_key_falls_back_to_environment() {
        temp_env::with_var("OPENAI_API_KEY", Some("sk-env-0123456789abcdef"), || {
            let config = OpenAiChatConfig::default();
            assert_eq!(config.resolve_api_key().unwrap(), "sk-env-0123456789abcdef");
            assert!(OpenAiChatGenerator::new(config).is_ok());
        });
    }
}
