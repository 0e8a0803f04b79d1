//! ScyllaDB persistence layer
//!
//! Durable storage for:
//! - Sessions, history and the per-session response cache (TTL'd)
//! - Contact requests
//! - Archived conversations
//!
//! Everything degrades: the server falls back to the in-memory session
//! backend when the cluster is unreachable, and the contact/archive
//! stores are simply not wired.

pub mod client;
pub mod contacts;
pub mod conversations;
pub mod error;
pub mod schema;
pub mod sessions;

pub use client::{ScyllaClient, ScyllaConfig};
pub use contacts::{ContactRequestStore, ScyllaContactRequestStore};
pub use conversations::ConversationArchive;
pub use error::PersistenceError;
pub use sessions::ScyllaSessionBackend;

/// Connect, ensure the schema, and return a ready client
pub async fn init(config: ScyllaConfig) -> Result<ScyllaClient, PersistenceError> {
    let client = ScyllaClient::connect(config).await?;
    client.ensure_schema().await?;
    Ok(client)
}
