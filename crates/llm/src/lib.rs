//! Language model backend
//!
//! OpenAI-compatible chat-completions client with timeout and retry.
//! The model itself is an external collaborator; this crate only does
//! the plumbing.

pub mod backend;

pub use backend::{LlmConfig, OpenAiChatBackend};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for support_agent_core::Error {
    fn from(err: LlmError) -> Self {
        support_agent_core::Error::Llm(err.to_string())
    }
}
