//! Session backend trait and records

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use support_agent_core::{ContactFormData, ContactFormState, Turn};

use crate::SessionError;

/// Session metadata as stored by a backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub turn_count: u64,
    pub form_state: ContactFormState,
    pub form_data: ContactFormData,
}

impl SessionRecord {
    pub fn new(session_id: impl Into<String>, form_state: ContactFormState) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            created_at: now,
            last_activity: now,
            turn_count: 0,
            form_state,
            form_data: ContactFormData::default(),
        }
    }
}

/// A cached query-response pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedReply {
    /// The query exactly as the user originally phrased it
    pub original_query: String,
    pub response: String,
}

/// Storage operations behind `SessionStore`
///
/// Every mutation refreshes the session's TTL. `bool` results report
/// whether the session existed (and was live) at the time of the call.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn insert_session(&self, record: &SessionRecord) -> Result<(), SessionError>;

    async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>, SessionError>;

    /// Refresh the TTL and last-activity timestamp and bump the turn
    /// counter
    async fn touch(&self, session_id: &str) -> Result<bool, SessionError>;

    /// Append a turn to the history
    async fn append_history(&self, session_id: &str, turn: &Turn) -> Result<bool, SessionError>;

    /// History in chronological order, truncated to the most recent
    /// `limit` entries when given
    async fn history(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Turn>, SessionError>;

    async fn set_form_state(
        &self,
        session_id: &str,
        state: ContactFormState,
    ) -> Result<bool, SessionError>;

    async fn set_form_data(
        &self,
        session_id: &str,
        data: &ContactFormData,
    ) -> Result<bool, SessionError>;

    /// Remove the session and everything keyed under it. Removing an
    /// absent session is not an error.
    async fn remove_session(&self, session_id: &str) -> Result<(), SessionError>;

    async fn cache_put(
        &self,
        session_id: &str,
        key: &str,
        reply: &CachedReply,
    ) -> Result<(), SessionError>;

    async fn cache_get(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<CachedReply>, SessionError>;

    /// Live session count, for stats
    async fn session_count(&self) -> Result<usize, SessionError>;

    /// Backend name for logging and health reporting
    fn backend_name(&self) -> &'static str;
}
