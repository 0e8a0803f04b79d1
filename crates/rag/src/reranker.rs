//! Keyword-overlap reranker
//!
//! Fast lexical scorer: the fraction of query terms that appear in the
//! passage. No model involved, so it never blocks the answer path; a
//! cross-encoder can replace it behind the same trait without touching
//! the retriever.

use support_agent_core::{PassageReranker, Result, ScoredPassage};

pub struct OverlapReranker;

impl OverlapReranker {
    pub fn new() -> Self {
        Self
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| token.len() > 2)
            .map(|token| token.to_string())
            .collect()
    }

    /// Overlap score in [0, 1]
    pub fn score(query: &str, passage: &str) -> f32 {
        let query_terms = Self::tokenize(query);
        if query_terms.is_empty() {
            return 0.0;
        }
        let passage_terms = Self::tokenize(passage);
        let matches = query_terms
            .iter()
            .filter(|term| passage_terms.contains(term))
            .count();
        matches as f32 / query_terms.len() as f32
    }
}

impl Default for OverlapReranker {
    fn default() -> Self {
        Self::new()
    }
}

impl PassageReranker for OverlapReranker {
    fn rerank(
        &self,
        query: &str,
        passages: Vec<ScoredPassage>,
        top_k: usize,
    ) -> Result<Vec<ScoredPassage>> {
        let mut scored: Vec<(f32, ScoredPassage)> = passages
            .into_iter()
            .map(|passage| (Self::score(query, &passage.content), passage))
            .collect();

        // stable sort keeps the vector-search order among ties
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(_, passage)| passage)
            .collect())
    }

    fn name(&self) -> &str {
        "keyword_overlap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_range() {
        assert_eq!(OverlapReranker::score("", "anything"), 0.0);
        assert_eq!(
            OverlapReranker::score("refund policy", "our refund policy explained"),
            1.0
        );
        let partial = OverlapReranker::score("refund policy details", "refund rules");
        assert!(partial > 0.0 && partial < 1.0);
    }

    #[test]
    fn test_rerank_orders_by_overlap() {
        let reranker = OverlapReranker::new();
        let passages = vec![
            ScoredPassage::new("shipping times and carriers", 0.3),
            ScoredPassage::new("refund policy and refund timelines", 0.5),
            ScoredPassage::new("account deletion steps", 0.4),
        ];

        let ranked = reranker
            .rerank("refund policy", passages, 2)
            .unwrap();

        assert_eq!(ranked.len(), 2);
        assert!(ranked[0].content.contains("refund"));
    }

    #[test]
    fn test_rerank_truncates_to_top_k() {
        let reranker = OverlapReranker::new();
        let passages = (0..10)
            .map(|i| ScoredPassage::new(format!("passage {i}"), i as f32 * 0.1))
            .collect();
        let ranked = reranker.rerank("passage", passages, 3).unwrap();
        assert_eq!(ranked.len(), 3);
    }
}
