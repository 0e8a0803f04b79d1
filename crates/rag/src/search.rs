//! HTTP vector-search client
//!
//! Talks to the vector-search sidecar that owns embeddings and the
//! document collection. The wire shape is a plain JSON query API; the
//! embedding model never crosses this boundary.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use support_agent_core::{Result, ScoredPassage, VectorSearch};

use crate::RagError;

#[derive(Debug, Clone)]
pub struct VectorSearchConfig {
    pub endpoint: String,
    pub collection: String,
    pub timeout: Duration,
}

impl Default for VectorSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000".to_string(),
            collection: "support_docs".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    collection: &'a str,
    query: &'a str,
    n_results: usize,
}

#[derive(Deserialize)]
struct QueryResponse {
    results: Vec<QueryResult>,
}

#[derive(Deserialize)]
struct QueryResult {
    content: String,
    #[serde(default)]
    source: Option<String>,
    distance: f32,
}

#[derive(Deserialize)]
struct CountResponse {
    count: usize,
}

#[derive(Clone)]
pub struct HttpVectorSearch {
    client: Client,
    config: VectorSearchConfig,
}

impl HttpVectorSearch {
    pub fn new(config: VectorSearchConfig) -> std::result::Result<Self, RagError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RagError::Http)?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl VectorSearch for HttpVectorSearch {
    async fn search(&self, query: &str, n_results: usize) -> Result<Vec<ScoredPassage>> {
        let request = QueryRequest {
            collection: &self.config.collection,
            query,
            n_results,
        };

        let response = self
            .client
            .post(self.url("/search"))
            .json(&request)
            .send()
            .await
            .map_err(RagError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Search(format!("{status}: {body}")).into());
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| RagError::InvalidResponse(e.to_string()))?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| {
                let mut passage = ScoredPassage::new(r.content, r.distance);
                if let Some(source) = r.source {
                    passage = passage.with_source(source);
                }
                passage
            })
            .collect())
    }

    async fn collection_size(&self) -> Result<usize> {
        let url = self.url(&format!("/collections/{}/count", self.config.collection));
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(RagError::Http)?
            .error_for_status()
            .map_err(RagError::Http)?;

        let parsed: CountResponse = response
            .json()
            .await
            .map_err(|e| RagError::InvalidResponse(e.to_string()))?;
        Ok(parsed.count)
    }

    fn name(&self) -> &str {
        "http_vector_search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let search = HttpVectorSearch::new(VectorSearchConfig {
            endpoint: "http://localhost:8000/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(search.url("/search"), "http://localhost:8000/search");
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"results":[{"content":"refund text","source":"refund.md","distance":0.4},{"content":"no source","distance":1.1}]}"#;
        let parsed: QueryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].source.as_deref(), Some("refund.md"));
        assert!(parsed.results[1].source.is_none());
    }
}
