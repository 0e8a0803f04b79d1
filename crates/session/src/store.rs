//! Session store facade
//!
//! One interface for all session state. The backend (durable or
//! in-memory) is picked once at construction; callers cannot tell which
//! one they got. Read paths degrade to empty results on backend errors,
//! mutation paths report `false`, and history appends are best-effort,
//! so a storage hiccup never takes a conversation down.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use support_agent_core::{ContactFormData, ContactFormState, Turn, TurnRole};
use uuid::Uuid;

use crate::backend::{CachedReply, SessionBackend, SessionRecord};

// normalization strips punctuation so "Refunds?" and "refunds" collide
static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());

/// Canonical cache key for a query
pub fn normalize_query(query: &str) -> String {
    let lowered = query.to_lowercase();
    let stripped = NON_ALNUM.replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    /// Form state newly created sessions start in
    initial_form_state: ContactFormState,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            backend,
            initial_form_state: ContactFormState::Idle,
        }
    }

    /// Start new sessions in the up-front details collection flow
    pub fn with_initial_details_collection(mut self, enabled: bool) -> Self {
        self.initial_form_state = if enabled {
            ContactFormState::InitialCollectingName
        } else {
            ContactFormState::Idle
        };
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Create a session and return its id
    pub async fn create_session(&self) -> Result<String, crate::SessionError> {
        let session_id = Uuid::new_v4().to_string();
        let record = SessionRecord::new(&session_id, self.initial_form_state);
        self.backend.insert_session(&record).await?;
        tracing::info!(
            session_id = %session_id,
            backend = self.backend.backend_name(),
            "Session created"
        );
        Ok(session_id)
    }

    /// Refresh the session's TTL and bump its turn count. `false` means
    /// unknown or expired.
    pub async fn update_session_activity(&self, session_id: &str) -> bool {
        match self.backend.touch(session_id).await {
            Ok(live) => live,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Activity refresh failed");
                false
            }
        }
    }

    /// Best-effort history append: failures are logged, never surfaced.
    pub async fn append_message_to_history(
        &self,
        session_id: &str,
        role: TurnRole,
        content: &str,
    ) {
        match self.backend.append_history(session_id, &Turn::new(role, content)).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(session_id = %session_id, "History append skipped, session gone");
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "History append failed");
            }
        }
    }

    /// History in chronological order; empty for unknown sessions.
    pub async fn get_session_history(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Vec<Turn> {
        match self.backend.history(session_id, limit).await {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "History read failed");
                Vec::new()
            }
        }
    }

    /// Most recent user message. With `skip_current` the newest user turn
    /// is ignored, which yields the query a followup refers back to.
    pub async fn get_last_user_query(
        &self,
        session_id: &str,
        skip_current: bool,
    ) -> Option<String> {
        let history = self.get_session_history(session_id, None).await;
        let mut user_turns = history
            .iter()
            .filter(|turn| turn.role == TurnRole::User)
            .map(|turn| turn.content.clone())
            .collect::<Vec<_>>();
        if skip_current {
            user_turns.pop();
        }
        user_turns.pop()
    }

    /// Current form state; `Idle` for unknown sessions.
    pub async fn contact_form_state(&self, session_id: &str) -> ContactFormState {
        match self.backend.get_session(session_id).await {
            Ok(Some(record)) => record.form_state,
            Ok(None) => ContactFormState::Idle,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Form state read failed");
                ContactFormState::Idle
            }
        }
    }

    pub async fn set_contact_form_state(
        &self,
        session_id: &str,
        state: ContactFormState,
    ) -> bool {
        match self.backend.set_form_state(session_id, state).await {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Form state write failed");
                false
            }
        }
    }

    pub async fn contact_form_data(&self, session_id: &str) -> ContactFormData {
        match self.backend.get_session(session_id).await {
            Ok(Some(record)) => record.form_data,
            Ok(None) => ContactFormData::default(),
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Form data read failed");
                ContactFormData::default()
            }
        }
    }

    pub async fn set_contact_form_data(
        &self,
        session_id: &str,
        data: &ContactFormData,
    ) -> bool {
        match self.backend.set_form_data(session_id, data).await {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Form data write failed");
                false
            }
        }
    }

    /// Remove the session and its keyed state. Clearing an absent
    /// session is a successful no-op.
    pub async fn clear_session(&self, session_id: &str) -> bool {
        match self.backend.remove_session(session_id).await {
            Ok(()) => {
                tracing::info!(session_id = %session_id, "Session cleared");
                true
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Session clear failed");
                false
            }
        }
    }

    /// Cached reply for an exact (normalized) repeat of a query
    pub async fn cached_response(&self, session_id: &str, query: &str) -> Option<CachedReply> {
        let key = normalize_query(query);
        if key.is_empty() {
            return None;
        }
        match self.backend.cache_get(session_id, &key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Cache read failed");
                None
            }
        }
    }

    /// Best-effort cache write
    pub async fn cache_response(&self, session_id: &str, query: &str, response: &str) {
        let key = normalize_query(query);
        if key.is_empty() {
            return;
        }
        let reply = CachedReply {
            original_query: query.to_string(),
            response: response.to_string(),
        };
        if let Err(e) = self.backend.cache_put(session_id, &key, &reply).await {
            tracing::warn!(session_id = %session_id, error = %e, "Cache write failed");
        }
    }

    pub async fn session_info(&self, session_id: &str) -> Option<SessionRecord> {
        match self.backend.get_session(session_id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Session read failed");
                None
            }
        }
    }

    pub async fn active_session_count(&self) -> usize {
        self.backend.session_count().await.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemorySessionBackend;
    use std::time::Duration;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(InMemorySessionBackend::new(Duration::from_secs(60))))
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(
            normalize_query("  What is your REFUND Policy?! "),
            "what is your refund policy"
        );
        assert_eq!(normalize_query("!!!"), "");
    }

    #[tokio::test]
    async fn test_mutations_on_missing_session() {
        let store = store();
        assert!(!store.update_session_activity("nope").await);
        assert!(!store.set_contact_form_state("nope", ContactFormState::CollectingName).await);
        assert!(!store.set_contact_form_data("nope", &ContactFormData::default()).await);
        // best-effort append must not panic
        store.append_message_to_history("nope", TurnRole::User, "hi").await;
        assert!(store.get_session_history("nope", None).await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let store = store();
        let id = store.create_session().await.unwrap();
        assert!(store.update_session_activity(&id).await);

        assert!(store.clear_session(&id).await);
        assert!(store.clear_session(&id).await);
        assert!(!store.update_session_activity(&id).await);
    }

    #[tokio::test]
    async fn test_last_user_query_skip_current() {
        let store = store();
        let id = store.create_session().await.unwrap();

        store.append_message_to_history(&id, TurnRole::User, "first question").await;
        store.append_message_to_history(&id, TurnRole::Bot, "first answer").await;
        store.append_message_to_history(&id, TurnRole::User, "tell me more").await;

        assert_eq!(
            store.get_last_user_query(&id, false).await.as_deref(),
            Some("tell me more")
        );
        assert_eq!(
            store.get_last_user_query(&id, true).await.as_deref(),
            Some("first question")
        );
    }

    #[tokio::test]
    async fn test_last_user_query_empty_history() {
        let store = store();
        let id = store.create_session().await.unwrap();
        assert!(store.get_last_user_query(&id, false).await.is_none());
        assert!(store.get_last_user_query(&id, true).await.is_none());
    }

    #[tokio::test]
    async fn test_form_state_round_trip() {
        let store = store();
        let id = store.create_session().await.unwrap();

        assert_eq!(store.contact_form_state(&id).await, ContactFormState::Idle);
        assert!(store.set_contact_form_state(&id, ContactFormState::AskingConsent).await);
        assert_eq!(
            store.contact_form_state(&id).await,
            ContactFormState::AskingConsent
        );
    }

    #[tokio::test]
    async fn test_initial_details_collection_start_state() {
        let backend = Arc::new(InMemorySessionBackend::new(Duration::from_secs(60)));
        let store = SessionStore::new(backend).with_initial_details_collection(true);
        let id = store.create_session().await.unwrap();
        assert_eq!(
            store.contact_form_state(&id).await,
            ContactFormState::InitialCollectingName
        );
    }

    #[tokio::test]
    async fn test_cache_normalized_exact_match() {
        let store = store();
        let id = store.create_session().await.unwrap();

        store
            .cache_response(&id, "What is your refund policy?", "Refunds take five days.")
            .await;

        let hit = store.cached_response(&id, "what is your REFUND policy").await;
        assert_eq!(hit.unwrap().response, "Refunds take five days.");

        assert!(store.cached_response(&id, "shipping times").await.is_none());
    }
}
