//! Language model trait

use async_trait::async_trait;

use crate::Result;

/// Text-generation interface
///
/// Implementations:
/// - `OpenAiChatBackend` - OpenAI-compatible chat-completions endpoint
///
/// # Example
///
/// ```ignore
/// let llm: Arc<dyn LanguageModel> = Arc::new(OpenAiChatBackend::new(config)?);
/// let reply = llm.generate("Summarize the refund policy").await?;
/// ```
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Generate a completion for a fully rendered prompt
    ///
    /// Must surface provider failures as errors so callers can apply
    /// their own fallbacks; never returns a silent empty success.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check whether the backing model currently answers
    async fn is_available(&self) -> bool;

    /// Model name for logging
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct MockLlm;

    #[async_trait]
    impl LanguageModel for MockLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            if prompt.is_empty() {
                return Err(Error::Llm("empty prompt".into()));
            }
            Ok("Mock response".to_string())
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "mock-llm"
        }
    }

    #[tokio::test]
    async fn test_mock_llm() {
        let llm = MockLlm;
        assert!(llm.is_available().await);
        assert_eq!(llm.model_name(), "mock-llm");
        assert_eq!(llm.generate("Hello").await.unwrap(), "Mock response");
        assert!(llm.generate("").await.is_err());
    }
}
