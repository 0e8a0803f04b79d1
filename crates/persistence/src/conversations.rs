//! Conversation archive
//!
//! Snapshots the full transcript when a session ends, before the TTL'd
//! session rows expire. Archived rows have no TTL.

use chrono::Utc;
use support_agent_core::{ContactFormData, Turn};

use crate::client::ScyllaClient;
use crate::error::PersistenceError;

#[derive(Clone)]
pub struct ConversationArchive {
    client: ScyllaClient,
}

impl ConversationArchive {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    pub async fn save_conversation(
        &self,
        session_id: &str,
        history: &[Turn],
        details: &ContactFormData,
    ) -> Result<(), PersistenceError> {
        let history_json = serde_json::to_string(history)
            .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;
        let user_details_json = serde_json::to_string(details)
            .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        let query = format!(
            "INSERT INTO {}.conversations (
                session_id, saved_at, history_json, user_details_json, message_count
            ) VALUES (?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    session_id,
                    Utc::now().timestamp_millis(),
                    history_json,
                    user_details_json,
                    history.len() as i32,
                ),
            )
            .await?;

        tracing::info!(
            session_id = %session_id,
            message_count = history.len(),
            "Conversation archived"
        );
        Ok(())
    }
}
