//! Configuration management for the support agent
//!
//! Supports loading configuration from:
//! - TOML files (`support-agent.toml`)
//! - Environment variables (SUPPORT_AGENT_ prefix)

pub mod settings;

pub use settings::{
    load_settings, AgentSettings, LlmSettings, RetrievalSettings, ScyllaSettings, ServerSettings,
    SessionSettings, Settings, VectorSearchSettings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
