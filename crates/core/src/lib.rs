//! Core traits and types for the support agent
//!
//! This crate provides foundational types used across all other crates:
//! - Collaborator traits (language model, vector search, reranker)
//! - Conversation and intent types
//! - Contact-form types
//! - Retrieved passage types
//! - Error types

pub mod contact;
pub mod conversation;
pub mod error;
pub mod intent;
pub mod outcome;
pub mod passage;
pub mod traits;

pub use contact::{ContactFormData, ContactFormState, ContactRequest, ContactStatus};
pub use conversation::{Turn, TurnRole};
pub use error::{Error, Result};
pub use intent::Intent;
pub use outcome::{RetrievalOutcome, TurnOutcome};
pub use passage::ScoredPassage;
pub use traits::{ContactRequestSink, LanguageModel, PassageReranker, VectorSearch};
