//! Retrieval pipeline
//!
//! search -> distance filter -> optional rerank -> source diversification

use std::sync::Arc;

use support_agent_core::{PassageReranker, Result, ScoredPassage, VectorSearch};

/// Retrieval tuning knobs
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Passages at or above this distance are considered irrelevant
    pub distance_threshold: f32,
    /// Round-robin cap per source document
    pub max_per_source: usize,
    pub rerank_enabled: bool,
    /// Candidates fetched when reranking is on
    pub rerank_candidates: usize,
    /// Passages kept after reranking
    pub rerank_top_k: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 1.5,
            max_per_source: 2,
            rerank_enabled: true,
            rerank_candidates: 15,
            rerank_top_k: 5,
        }
    }
}

pub struct Retriever {
    search: Arc<dyn VectorSearch>,
    reranker: Option<Arc<dyn PassageReranker>>,
    config: RetrieverConfig,
}

impl Retriever {
    pub fn new(search: Arc<dyn VectorSearch>, config: RetrieverConfig) -> Self {
        Self {
            search,
            reranker: None,
            config,
        }
    }

    pub fn with_reranker(mut self, reranker: Arc<dyn PassageReranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Retrieve up to `n_results` relevant, source-diverse passages.
    ///
    /// An empty result means nothing in the collection was relevant
    /// enough, which callers treat as "cannot answer from knowledge".
    pub async fn retrieve(&self, query: &str, n_results: usize) -> Result<Vec<ScoredPassage>> {
        let reranking = self.config.rerank_enabled && self.reranker.is_some();
        let fetch = if reranking {
            self.config.rerank_candidates.max(n_results)
        } else {
            n_results
        };

        let raw = self.search.search(query, fetch).await?;
        let fetched = raw.len();

        let filtered: Vec<ScoredPassage> = raw
            .into_iter()
            .filter(|passage| passage.distance < self.config.distance_threshold)
            .collect();

        tracing::debug!(
            fetched,
            relevant = filtered.len(),
            threshold = self.config.distance_threshold,
            "Passages filtered by distance"
        );

        let ranked = if reranking {
            self.apply_rerank(query, filtered)
        } else {
            filtered
        };

        Ok(diversify(ranked, self.config.max_per_source, n_results))
    }

    /// Rerank, falling back to the original order on failure.
    fn apply_rerank(&self, query: &str, passages: Vec<ScoredPassage>) -> Vec<ScoredPassage> {
        let Some(reranker) = self.reranker.as_deref() else {
            return passages;
        };
        let top_k = self.config.rerank_top_k;
        match reranker.rerank(query, passages.clone(), top_k) {
            Ok(ranked) => ranked,
            Err(e) => {
                tracing::warn!(
                    reranker = reranker.name(),
                    error = %e,
                    "Rerank failed, keeping original order"
                );
                let mut fallback = passages;
                fallback.truncate(top_k);
                fallback
            }
        }
    }
}

/// Round-robin across sources so one document cannot crowd out the rest:
/// one passage per source per round, sources in first-appearance order,
/// at most `max_per_source` rounds and `max_total` passages overall.
fn diversify(
    passages: Vec<ScoredPassage>,
    max_per_source: usize,
    max_total: usize,
) -> Vec<ScoredPassage> {
    if passages.len() <= 1 {
        return passages;
    }

    let mut source_order: Vec<String> = Vec::new();
    let mut by_source: std::collections::HashMap<String, Vec<ScoredPassage>> =
        std::collections::HashMap::new();
    for passage in passages {
        let key = passage.source_key().to_string();
        if !by_source.contains_key(&key) {
            source_order.push(key.clone());
        }
        by_source.entry(key).or_default().push(passage);
    }

    let mut result = Vec::new();
    'rounds: for round in 0..max_per_source {
        let mut picked_any = false;
        for source in &source_order {
            if let Some(passage) = by_source.get_mut(source).and_then(|v| {
                if round < v.len() {
                    Some(v[round].clone())
                } else {
                    None
                }
            }) {
                result.push(passage);
                picked_any = true;
                if result.len() >= max_total {
                    break 'rounds;
                }
            }
        }
        if !picked_any {
            break;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use support_agent_core::Error;

    struct StaticSearch {
        passages: Vec<ScoredPassage>,
    }

    #[async_trait]
    impl VectorSearch for StaticSearch {
        async fn search(&self, _query: &str, n_results: usize) -> Result<Vec<ScoredPassage>> {
            Ok(self.passages.iter().take(n_results).cloned().collect())
        }

        async fn collection_size(&self) -> Result<usize> {
            Ok(self.passages.len())
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    struct FailingReranker;

    impl PassageReranker for FailingReranker {
        fn rerank(
            &self,
            _query: &str,
            _passages: Vec<ScoredPassage>,
            _top_k: usize,
        ) -> Result<Vec<ScoredPassage>> {
            Err(Error::Retrieval("model offline".into()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn passages_with_distances(distances: &[f32]) -> Vec<ScoredPassage> {
        distances
            .iter()
            .enumerate()
            .map(|(i, &d)| ScoredPassage::new(format!("passage {i}"), d).with_source("doc"))
            .collect()
    }

    #[tokio::test]
    async fn test_distance_filter_keeps_order() {
        let search = Arc::new(StaticSearch {
            passages: passages_with_distances(&[0.3, 1.2, 1.8, 2.0]),
        });
        let config = RetrieverConfig {
            rerank_enabled: false,
            max_per_source: 4,
            ..Default::default()
        };
        let retriever = Retriever::new(search, config);

        let result = retriever.retrieve("anything", 4).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].content, "passage 0");
        assert_eq!(result[1].content, "passage 1");
    }

    #[tokio::test]
    async fn test_threshold_is_exclusive() {
        let search = Arc::new(StaticSearch {
            passages: passages_with_distances(&[1.5]),
        });
        let config = RetrieverConfig {
            rerank_enabled: false,
            ..Default::default()
        };
        let retriever = Retriever::new(search, config);

        let result = retriever.retrieve("anything", 3).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_rerank_failure_falls_back_truncated() {
        let search = Arc::new(StaticSearch {
            passages: passages_with_distances(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]),
        });
        let config = RetrieverConfig {
            rerank_enabled: true,
            rerank_top_k: 2,
            max_per_source: 7,
            ..Default::default()
        };
        let retriever =
            Retriever::new(search, config).with_reranker(Arc::new(FailingReranker));

        let result = retriever.retrieve("anything", 7).await.unwrap();
        // original order, truncated to rerank_top_k
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].content, "passage 0");
        assert_eq!(result[1].content, "passage 1");
    }

    #[test]
    fn test_diversify_round_robin() {
        let passages = vec![
            ScoredPassage::new("a1", 0.1).with_source("a"),
            ScoredPassage::new("a2", 0.2).with_source("a"),
            ScoredPassage::new("a3", 0.3).with_source("a"),
            ScoredPassage::new("b1", 0.4).with_source("b"),
            ScoredPassage::new("c1", 0.5).with_source("c"),
        ];

        let result = diversify(passages, 2, 4);
        let contents: Vec<&str> = result.iter().map(|p| p.content.as_str()).collect();
        // round 1 visits each source, round 2 picks the runner-up from "a"
        assert_eq!(contents, vec!["a1", "b1", "c1", "a2"]);
    }

    #[test]
    fn test_diversify_respects_global_cap() {
        let passages = vec![
            ScoredPassage::new("a1", 0.1).with_source("a"),
            ScoredPassage::new("b1", 0.2).with_source("b"),
            ScoredPassage::new("c1", 0.3).with_source("c"),
        ];
        assert_eq!(diversify(passages, 2, 2).len(), 2);
    }
}
