//! In-memory session backend
//!
//! Process-local fallback used when the durable backend is unavailable or
//! disabled. Expiry is enforced lazily on access plus a periodic sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use support_agent_core::{ContactFormData, ContactFormState, Turn};
use tokio::sync::watch;

use crate::backend::{CachedReply, SessionBackend, SessionRecord};
use crate::SessionError;

struct SessionEntry {
    record: SessionRecord,
    history: Vec<Turn>,
    cache: HashMap<String, CachedReply>,
    expires_at: Instant,
}

pub struct InMemorySessionBackend {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
}

impl InMemorySessionBackend {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Drop expired sessions. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(removed, "Expired sessions purged");
        }
        removed
    }

    /// Spawn the periodic expiry sweep. Dropping the returned sender
    /// stops the task.
    pub fn start_cleanup(self: &Arc<Self>, interval: Duration) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let backend = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        backend.purge_expired();
                    }
                    result = shutdown_rx.changed() => {
                        if result.is_err() || *shutdown_rx.borrow() {
                            tracing::debug!("Session cleanup task stopping");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    /// Run `f` against a live session, refreshing its TTL. Expired
    /// entries are removed on the way.
    fn with_live_entry<T>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut SessionEntry) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.write();
        let entry = sessions.get_mut(session_id)?;
        if entry.expires_at <= Instant::now() {
            sessions.remove(session_id);
            return None;
        }
        entry.expires_at = Instant::now() + self.ttl;
        entry.record.last_activity = Utc::now();
        Some(f(entry))
    }
}

#[async_trait]
impl SessionBackend for InMemorySessionBackend {
    async fn insert_session(&self, record: &SessionRecord) -> Result<(), SessionError> {
        let entry = SessionEntry {
            record: record.clone(),
            history: Vec::new(),
            cache: HashMap::new(),
            expires_at: Instant::now() + self.ttl,
        };
        self.sessions
            .write()
            .insert(record.session_id.clone(), entry);
        Ok(())
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>, SessionError> {
        Ok(self.with_live_entry(session_id, |entry| entry.record.clone()))
    }

    async fn touch(&self, session_id: &str) -> Result<bool, SessionError> {
        Ok(self
            .with_live_entry(session_id, |entry| {
                entry.record.turn_count += 1;
            })
            .is_some())
    }

    async fn append_history(&self, session_id: &str, turn: &Turn) -> Result<bool, SessionError> {
        Ok(self
            .with_live_entry(session_id, |entry| {
                entry.history.push(turn.clone());
            })
            .is_some())
    }

    async fn history(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Turn>, SessionError> {
        Ok(self
            .with_live_entry(session_id, |entry| {
                let history = &entry.history;
                match limit {
                    Some(n) if history.len() > n => history[history.len() - n..].to_vec(),
                    _ => history.clone(),
                }
            })
            .unwrap_or_default())
    }

    async fn set_form_state(
        &self,
        session_id: &str,
        state: ContactFormState,
    ) -> Result<bool, SessionError> {
        Ok(self
            .with_live_entry(session_id, |entry| {
                entry.record.form_state = state;
            })
            .is_some())
    }

    async fn set_form_data(
        &self,
        session_id: &str,
        data: &ContactFormData,
    ) -> Result<bool, SessionError> {
        Ok(self
            .with_live_entry(session_id, |entry| {
                entry.record.form_data = data.clone();
            })
            .is_some())
    }

    async fn remove_session(&self, session_id: &str) -> Result<(), SessionError> {
        self.sessions.write().remove(session_id);
        Ok(())
    }

    async fn cache_put(
        &self,
        session_id: &str,
        key: &str,
        reply: &CachedReply,
    ) -> Result<(), SessionError> {
        self.with_live_entry(session_id, |entry| {
            entry.cache.insert(key.to_string(), reply.clone());
        });
        Ok(())
    }

    async fn cache_get(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<CachedReply>, SessionError> {
        Ok(self
            .with_live_entry(session_id, |entry| entry.cache.get(key).cloned())
            .flatten())
    }

    async fn session_count(&self) -> Result<usize, SessionError> {
        let now = Instant::now();
        Ok(self
            .sessions
            .read()
            .values()
            .filter(|entry| entry.expires_at > now)
            .count())
    }

    fn backend_name(&self) -> &'static str {
        "in_memory"
    }
}
