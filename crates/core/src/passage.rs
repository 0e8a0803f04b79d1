//! Retrieved passage types

use serde::{Deserialize, Serialize};

/// A passage returned by the vector-search collaborator
///
/// `distance` is the embedding distance to the query: lower is more
/// relevant. Passages are compared against a relevance threshold before
/// they are allowed to ground an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub content: String,
    /// Originating document identifier, when the collection carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub distance: f32,
}

impl ScoredPassage {
    pub fn new(content: impl Into<String>, distance: f32) -> Self {
        Self {
            content: content.into(),
            source: None,
            distance,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Grouping key for source diversification
    pub fn source_key(&self) -> &str {
        self.source.as_deref().unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let passage = ScoredPassage::new("Refunds are processed in 5 days", 0.42)
            .with_source("refund_policy.md");
        assert_eq!(passage.source_key(), "refund_policy.md");
        assert!(passage.distance < 0.5);
    }

    #[test]
    fn test_missing_source_key() {
        let passage = ScoredPassage::new("text", 1.0);
        assert_eq!(passage.source_key(), "unknown");
    }
}
