//! Durable session backend on ScyllaDB
//!
//! TTL handling leans on the table-level `default_time_to_live`: every
//! rewrite re-arms the clock, so an idle session's rows simply expire.
//! `touch` and the other mutations rewrite the full metadata row to keep
//! all columns on the same TTL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use support_agent_core::{ContactFormData, ContactFormState, Turn, TurnRole};
use support_agent_session::{CachedReply, SessionBackend, SessionError, SessionRecord};
use uuid::Uuid;

use crate::client::ScyllaClient;
use crate::error::PersistenceError;

#[derive(Clone)]
pub struct ScyllaSessionBackend {
    client: ScyllaClient,
}

impl ScyllaSessionBackend {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    async fn write_record(&self, record: &SessionRecord) -> Result<(), PersistenceError> {
        let form_data_json = serde_json::to_string(&record.form_data)
            .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        let query = format!(
            "INSERT INTO {}.sessions (
                session_id, created_at, last_activity, turn_count, form_state, form_data_json
            ) VALUES (?, ?, ?, ?, ?, ?) USING TTL {}",
            self.client.keyspace(),
            self.client.session_ttl_secs()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    &record.session_id,
                    record.created_at.timestamp_millis(),
                    record.last_activity.timestamp_millis(),
                    record.turn_count as i32,
                    record.form_state.as_str(),
                    form_data_json,
                ),
            )
            .await?;

        Ok(())
    }

    async fn read_record(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionRecord>, PersistenceError> {
        let query = format!(
            "SELECT session_id, created_at, last_activity, turn_count, form_state, form_data_json
             FROM {}.sessions WHERE session_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (session_id,))
            .await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                let (session_id, created_at, last_activity, turn_count, form_state, form_data_json): (
                    String,
                    i64,
                    i64,
                    i32,
                    String,
                    String,
                ) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

                let form_data: ContactFormData =
                    serde_json::from_str(&form_data_json).unwrap_or_default();

                return Ok(Some(SessionRecord {
                    session_id,
                    created_at: DateTime::from_timestamp_millis(created_at)
                        .unwrap_or_else(Utc::now),
                    last_activity: DateTime::from_timestamp_millis(last_activity)
                        .unwrap_or_else(Utc::now),
                    turn_count: turn_count.max(0) as u64,
                    form_state: ContactFormState::parse(&form_state),
                    form_data,
                }));
            }
        }

        Ok(None)
    }

    /// Read-modify-write on the metadata row; `false` when the session
    /// does not exist (or already expired).
    async fn update_record(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut SessionRecord),
    ) -> Result<bool, PersistenceError> {
        let Some(mut record) = self.read_record(session_id).await? else {
            return Ok(false);
        };
        record.last_activity = Utc::now();
        f(&mut record);
        self.write_record(&record).await?;
        Ok(true)
    }
}

#[async_trait]
impl SessionBackend for ScyllaSessionBackend {
    async fn insert_session(&self, record: &SessionRecord) -> Result<(), SessionError> {
        self.write_record(record).await?;
        Ok(())
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>, SessionError> {
        Ok(self.read_record(session_id).await?)
    }

    async fn touch(&self, session_id: &str) -> Result<bool, SessionError> {
        Ok(self
            .update_record(session_id, |record| {
                record.turn_count += 1;
            })
            .await?)
    }

    async fn append_history(&self, session_id: &str, turn: &Turn) -> Result<bool, SessionError> {
        // full-row rewrite re-arms the metadata TTL alongside the new
        // history row
        let live = self.update_record(session_id, |_| {}).await?;
        if !live {
            return Ok(false);
        }

        let query = format!(
            "INSERT INTO {}.session_history (session_id, created_at, entry_id, role, content)
             VALUES (?, ?, ?, ?, ?) USING TTL {}",
            self.client.keyspace(),
            self.client.session_ttl_secs()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    session_id,
                    turn.timestamp.timestamp_millis(),
                    Uuid::new_v4(),
                    turn.role.as_str(),
                    &turn.content,
                ),
            )
            .await
            .map_err(PersistenceError::Query)?;

        Ok(true)
    }

    async fn history(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Turn>, SessionError> {
        let query = format!(
            "SELECT role, content, created_at FROM {}.session_history WHERE session_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (session_id,))
            .await
            .map_err(PersistenceError::Query)?;

        let mut turns = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                let (role, content, created_at): (String, String, i64) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;
                turns.push(Turn {
                    role: TurnRole::parse(&role),
                    content,
                    timestamp: DateTime::from_timestamp_millis(created_at)
                        .unwrap_or_else(Utc::now),
                });
            }
        }

        if let Some(n) = limit {
            if turns.len() > n {
                turns.drain(..turns.len() - n);
            }
        }

        Ok(turns)
    }

    async fn set_form_state(
        &self,
        session_id: &str,
        state: ContactFormState,
    ) -> Result<bool, SessionError> {
        Ok(self
            .update_record(session_id, |record| {
                record.form_state = state;
            })
            .await?)
    }

    async fn set_form_data(
        &self,
        session_id: &str,
        data: &ContactFormData,
    ) -> Result<bool, SessionError> {
        let data = data.clone();
        Ok(self
            .update_record(session_id, move |record| {
                record.form_data = data;
            })
            .await?)
    }

    async fn remove_session(&self, session_id: &str) -> Result<(), SessionError> {
        for table in ["sessions", "session_history", "response_cache"] {
            let query = format!(
                "DELETE FROM {}.{} WHERE session_id = ?",
                self.client.keyspace(),
                table
            );
            self.client
                .session()
                .query_unpaged(query, (session_id,))
                .await
                .map_err(PersistenceError::Query)?;
        }
        Ok(())
    }

    async fn cache_put(
        &self,
        session_id: &str,
        key: &str,
        reply: &CachedReply,
    ) -> Result<(), SessionError> {
        let query = format!(
            "INSERT INTO {}.response_cache (session_id, query_key, original_query, response, created_at)
             VALUES (?, ?, ?, ?, ?) USING TTL {}",
            self.client.keyspace(),
            self.client.session_ttl_secs()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    session_id,
                    key,
                    &reply.original_query,
                    &reply.response,
                    Utc::now().timestamp_millis(),
                ),
            )
            .await
            .map_err(PersistenceError::Query)?;

        Ok(())
    }

    async fn cache_get(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<CachedReply>, SessionError> {
        let query = format!(
            "SELECT original_query, response FROM {}.response_cache
             WHERE session_id = ? AND query_key = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (session_id, key))
            .await
            .map_err(PersistenceError::Query)?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                let (original_query, response): (String, String) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;
                return Ok(Some(CachedReply {
                    original_query,
                    response,
                }));
            }
        }

        Ok(None)
    }

    async fn session_count(&self) -> Result<usize, SessionError> {
        let query = format!("SELECT COUNT(*) FROM {}.sessions", self.client.keyspace());
        let result = self
            .client
            .session()
            .query_unpaged(query, &[])
            .await
            .map_err(PersistenceError::Query)?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                let (count,): (i64,) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;
                return Ok(count.max(0) as usize);
            }
        }

        Ok(0)
    }

    fn backend_name(&self) -> &'static str {
        "scylla"
    }
}
