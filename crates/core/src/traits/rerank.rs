//! Passage reranking trait

use crate::{Result, ScoredPassage};

/// Re-orders retrieved passages by query relevance
///
/// Failures are recoverable: the retriever falls back to the original
/// vector-search order when a reranker errors.
pub trait PassageReranker: Send + Sync + 'static {
    /// Return the `top_k` most relevant passages, best first
    fn rerank(
        &self,
        query: &str,
        passages: Vec<ScoredPassage>,
        top_k: usize,
    ) -> Result<Vec<ScoredPassage>>;

    /// Reranker name for logging
    fn name(&self) -> &str;
}
