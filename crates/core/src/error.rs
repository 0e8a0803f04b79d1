//! Error types shared across the workspace

use thiserror::Error;

/// Workspace-wide error type used at the trait seams
#[derive(Error, Debug)]
pub enum Error {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this failure should reach the caller as-is instead of
    /// being folded into the apologetic fallback reply.
    pub fn is_session_not_found(&self) -> bool {
        matches!(self, Error::SessionNotFound(_))
    }
}
