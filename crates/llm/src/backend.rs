//! OpenAI-compatible chat-completions backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use support_agent_core::{LanguageModel, Result};

use crate::LlmError;

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// Base URL of the chat-completions API (ending in `/v1`)
    pub endpoint: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Temperature
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Initial backoff duration (doubles each retry)
    pub initial_backoff: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "qwen2.5:7b-instruct".to_string(),
            endpoint: "http://localhost:11434/v1".to_string(),
            api_key: None,
            max_tokens: 512,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Chat-completions backend over HTTP
#[derive(Clone)]
pub struct OpenAiChatBackend {
    client: Client,
    config: LlmConfig,
}

impl OpenAiChatBackend {
    pub fn new(config: LlmConfig) -> std::result::Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    async fn execute_request(&self, prompt: &str) -> std::result::Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut builder = self.client.post(self.api_url("/chat/completions"));
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            // 5xx errors are retryable, 4xx are not
            if status.is_server_error() {
                return Err(LlmError::Network(format!("Server error {status}: {body}")));
            }
            return Err(LlmError::Api(format!("{status}: {body}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| LlmError::InvalidResponse("No completion in response".to_string()))
    }

    fn is_retryable(error: &LlmError) -> bool {
        matches!(error, LlmError::Network(_) | LlmError::Timeout)
    }

    async fn generate_with_retry(&self, prompt: &str) -> std::result::Result<String, LlmError> {
        let mut last_error = None;
        let mut backoff = self.config.initial_backoff;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    attempt,
                    max_retries = self.config.max_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    "LLM request failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute_request(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if Self::is_retryable(&e) => {
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(LlmError::Timeout))
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let started = std::time::Instant::now();
        let text = self.generate_with_retry(prompt).await?;
        tracing::debug!(
            model = %self.config.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = text.len(),
            "LLM generation complete"
        );
        Ok(text)
    }

    async fn is_available(&self) -> bool {
        let mut builder = self.client.get(self.api_url("/models"));
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }
        match builder.send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let backend = OpenAiChatBackend::new(LlmConfig {
            endpoint: "http://localhost:11434/v1/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            backend.api_url("/chat/completions"),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(OpenAiChatBackend::is_retryable(&LlmError::Timeout));
        assert!(OpenAiChatBackend::is_retryable(&LlmError::Network(
            "connection reset".into()
        )));
        assert!(!OpenAiChatBackend::is_retryable(&LlmError::Api(
            "400: bad request".into()
        )));
        assert!(!OpenAiChatBackend::is_retryable(&LlmError::InvalidResponse(
            "empty".into()
        )));
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"  Hello there  "}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        let content = parsed.choices[0].message.content.as_deref().unwrap();
        assert_eq!(content.trim(), "Hello there");
    }
}
