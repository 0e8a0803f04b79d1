//! Session lifecycle and per-session state
//!
//! `SessionStore` is the single interface the rest of the system talks to.
//! It is constructed once at startup around whichever `SessionBackend` is
//! available (durable or in-memory) and injected into its consumers; the
//! choice of backend is invisible to callers.

pub mod backend;
pub mod memory;
pub mod store;

pub use backend::{CachedReply, SessionBackend, SessionRecord};
pub use memory::InMemorySessionBackend;
pub use store::SessionStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Invalid session data: {0}")]
    InvalidData(String),
}
