//! Application settings

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Top-level settings, one section per subsystem
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub session: SessionSettings,
    pub retrieval: RetrievalSettings,
    pub llm: LlmSettings,
    pub vector_search: VectorSearchSettings,
    pub scylla: ScyllaSettings,
    pub agent: AgentSettings,
}

/// HTTP/WebSocket server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_enabled: false,
            cors_origins: Vec::new(),
        }
    }
}

/// Session lifecycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Idle seconds before a session expires
    pub timeout_secs: u64,
    /// How often the in-memory backend sweeps expired sessions
    pub cleanup_interval_secs: u64,
    /// Cap on history entries returned by default
    pub history_limit: usize,
    /// Collect name/email/phone up front when a session starts
    pub initial_details_collection: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 3600,
            cleanup_interval_secs: 300,
            history_limit: 50,
            initial_details_collection: false,
        }
    }
}

/// Retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Passages at or above this embedding distance are discarded
    pub distance_threshold: f32,
    /// Passages fetched for a fresh query
    pub top_n: usize,
    /// Passages fetched for a followup (wider net)
    pub followup_top_n: usize,
    /// Round-robin cap per source document
    pub max_per_source: usize,
    pub rerank_enabled: bool,
    /// Candidates fetched when reranking is on
    pub rerank_candidates: usize,
    /// Passages kept after reranking
    pub rerank_top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            distance_threshold: 1.5,
            top_n: 3,
            followup_top_n: 6,
            max_per_source: 2,
            rerank_enabled: true,
            rerank_candidates: 15,
            rerank_top_k: 5,
        }
    }
}

/// Language model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/v1".to_string(),
            api_key: None,
            model: "qwen2.5:7b-instruct".to_string(),
            max_tokens: 512,
            temperature: 0.7,
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

/// Vector-search sidecar settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorSearchSettings {
    pub endpoint: String,
    pub collection: String,
    pub timeout_secs: u64,
}

impl Default for VectorSearchSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000".to_string(),
            collection: "support_docs".to_string(),
            timeout_secs: 10,
        }
    }
}

/// ScyllaDB settings; disabled means fully in-memory operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScyllaSettings {
    pub enabled: bool,
    pub nodes: Vec<String>,
    pub keyspace: String,
}

impl Default for ScyllaSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            nodes: vec!["127.0.0.1:9042".to_string()],
            keyspace: "support_agent".to_string(),
        }
    }
}

/// Agent behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub assistant_name: String,
    pub company_name: String,
    /// Surfaced in fallback replies so users always have an escape hatch
    pub contact_email: String,
    /// Short description of what the knowledge collection covers
    pub knowledge_domain: String,
    /// Answers shorter than this are replaced with the apology fallback
    pub min_response_len: usize,
    /// Answers longer than this get an engagement prompt appended
    pub engagement_threshold: usize,
    /// Only answers longer than this are cached
    pub cache_min_response_len: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            assistant_name: "Alicia".to_string(),
            company_name: "TechGropse".to_string(),
            contact_email: "support@techgropse.com".to_string(),
            knowledge_domain: "our privacy policy".to_string(),
            min_response_len: 20,
            engagement_threshold: 100,
            cache_min_response_len: 50,
        }
    }
}

/// Load settings from `support-agent.toml` (optional) layered under
/// `SUPPORT_AGENT_*` environment variables.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from("support-agent")
}

pub fn load_settings_from(basename: &str) -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(basename).required(false))
        .add_source(
            config::Environment::with_prefix("SUPPORT_AGENT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize::<Settings>()?;

    tracing::debug!(
        port = settings.server.port,
        scylla_enabled = settings.scylla.enabled,
        "Settings loaded"
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_contract() {
        let settings = Settings::default();
        assert_eq!(settings.session.timeout_secs, 3600);
        assert_eq!(settings.retrieval.distance_threshold, 1.5);
        assert_eq!(settings.retrieval.top_n, 3);
        assert_eq!(settings.retrieval.followup_top_n, 6);
        assert_eq!(settings.retrieval.rerank_candidates, 15);
        assert_eq!(settings.retrieval.rerank_top_k, 5);
        assert_eq!(settings.agent.min_response_len, 20);
        assert_eq!(settings.agent.cache_min_response_len, 50);
    }

    #[test]
    fn test_partial_toml_overlay() {
        let partial: Settings = toml::from_str(
            r#"
            [server]
            port = 9090

            [retrieval]
            rerank_enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(partial.server.port, 9090);
        assert!(!partial.retrieval.rerank_enabled);
        // untouched sections keep their defaults
        assert_eq!(partial.session.timeout_secs, 3600);
        assert_eq!(partial.server.host, "0.0.0.0");
    }
}
