//! Vector-search trait

use async_trait::async_trait;

use crate::{Result, ScoredPassage};

/// Semantic search over the knowledge collection
///
/// Results come back in ascending distance order (most relevant first).
/// Relevance filtering is the retriever's job, not the collaborator's.
#[async_trait]
pub trait VectorSearch: Send + Sync + 'static {
    /// Return up to `n_results` nearest passages for the query
    async fn search(&self, query: &str, n_results: usize) -> Result<Vec<ScoredPassage>>;

    /// Number of documents in the collection, for stats and health checks
    async fn collection_size(&self) -> Result<usize>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
