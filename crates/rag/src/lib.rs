//! Retrieval orchestration
//!
//! Wraps the vector-search collaborator with relevance filtering,
//! optional reranking and source diversification. Nothing here touches a
//! model directly; embeddings and the collection live behind the
//! `VectorSearch` seam.

pub mod reranker;
pub mod retriever;
pub mod search;

pub use reranker::OverlapReranker;
pub use retriever::{Retriever, RetrieverConfig};
pub use search::{HttpVectorSearch, VectorSearchConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Search error: {0}")]
    Search(String),

    #[error("Reranker error: {0}")]
    Reranker(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<RagError> for support_agent_core::Error {
    fn from(err: RagError) -> Self {
        support_agent_core::Error::Retrieval(err.to_string())
    }
}
