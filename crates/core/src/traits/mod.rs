//! Collaborator traits
//!
//! Seams to the external model services and stores. Production
//! implementations live in the `llm`, `rag` and `persistence` crates;
//! tests supply mocks.

mod contact;
mod llm;
mod rerank;
mod search;

pub use contact::ContactRequestSink;
pub use llm::LanguageModel;
pub use rerank::PassageReranker;
pub use search::VectorSearch;
