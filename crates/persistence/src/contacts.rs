//! Contact-request storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scylla::frame::response::result::Row;
use support_agent_core::{ContactRequest, ContactRequestSink, ContactStatus};
use uuid::Uuid;

use crate::client::ScyllaClient;
use crate::error::PersistenceError;

/// Operational surface for contact requests, beyond what the agent
/// needs to file them.
#[async_trait]
pub trait ContactRequestStore: Send + Sync {
    async fn create(&self, request: &ContactRequest) -> Result<(), PersistenceError>;
    async fn get(
        &self,
        session_id: &str,
        request_id: Uuid,
    ) -> Result<Option<ContactRequest>, PersistenceError>;
    async fn update_status(
        &self,
        session_id: &str,
        request_id: Uuid,
        status: ContactStatus,
    ) -> Result<(), PersistenceError>;
    async fn list_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<ContactRequest>, PersistenceError>;
    async fn list_pending(&self) -> Result<Vec<ContactRequest>, PersistenceError>;
}

#[derive(Clone)]
pub struct ScyllaContactRequestStore {
    client: ScyllaClient,
}

impl ScyllaContactRequestStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    fn select_prefix(&self) -> String {
        format!(
            "SELECT session_id, request_id, name, email, mobile, preferred_datetime,
                    timezone, original_query, status, created_at
             FROM {}.contact_requests",
            self.client.keyspace()
        )
    }
}

fn row_to_request(row: Row) -> Result<ContactRequest, PersistenceError> {
    let (
        session_id,
        request_id,
        name,
        email,
        mobile,
        preferred_datetime,
        timezone,
        original_query,
        status,
        created_at,
    ): (
        String,
        Uuid,
        String,
        String,
        String,
        String,
        String,
        Option<String>,
        String,
        i64,
    ) = row
        .into_typed()
        .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

    Ok(ContactRequest {
        request_id,
        session_id,
        name,
        email,
        mobile,
        preferred_datetime,
        timezone,
        original_query,
        status: ContactStatus::parse(&status),
        created_at: DateTime::from_timestamp_millis(created_at).unwrap_or_else(Utc::now),
    })
}

#[async_trait]
impl ContactRequestStore for ScyllaContactRequestStore {
    async fn create(&self, request: &ContactRequest) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.contact_requests (
                session_id, request_id, name, email, mobile, preferred_datetime,
                timezone, original_query, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    &request.session_id,
                    request.request_id,
                    &request.name,
                    &request.email,
                    &request.mobile,
                    &request.preferred_datetime,
                    &request.timezone,
                    &request.original_query,
                    request.status.as_str(),
                    request.created_at.timestamp_millis(),
                ),
            )
            .await?;

        tracing::info!(
            session_id = %request.session_id,
            request_id = %request.request_id,
            "Contact request stored"
        );
        Ok(())
    }

    async fn get(
        &self,
        session_id: &str,
        request_id: Uuid,
    ) -> Result<Option<ContactRequest>, PersistenceError> {
        let query = format!(
            "{} WHERE session_id = ? AND request_id = ?",
            self.select_prefix()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (session_id, request_id))
            .await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                return Ok(Some(row_to_request(row)?));
            }
        }
        Ok(None)
    }

    async fn update_status(
        &self,
        session_id: &str,
        request_id: Uuid,
        status: ContactStatus,
    ) -> Result<(), PersistenceError> {
        let query = format!(
            "UPDATE {}.contact_requests SET status = ? WHERE session_id = ? AND request_id = ?",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(query, (status.as_str(), session_id, request_id))
            .await?;

        tracing::info!(
            session_id = %session_id,
            request_id = %request_id,
            status = status.as_str(),
            "Contact request status updated"
        );
        Ok(())
    }

    async fn list_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<ContactRequest>, PersistenceError> {
        let query = format!("{} WHERE session_id = ?", self.select_prefix());

        let result = self
            .client
            .session()
            .query_unpaged(query, (session_id,))
            .await?;

        let mut requests = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                requests.push(row_to_request(row)?);
            }
        }
        Ok(requests)
    }

    async fn list_pending(&self) -> Result<Vec<ContactRequest>, PersistenceError> {
        // Low-volume operational query; filtering is acceptable here.
        let query = format!("{} WHERE status = ? ALLOW FILTERING", self.select_prefix());

        let result = self
            .client
            .session()
            .query_unpaged(query, (ContactStatus::Pending.as_str(),))
            .await?;

        let mut requests = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                requests.push(row_to_request(row)?);
            }
        }
        Ok(requests)
    }
}

#[async_trait]
impl ContactRequestSink for ScyllaContactRequestStore {
    async fn create(&self, request: &ContactRequest) -> support_agent_core::Result<()> {
        ContactRequestStore::create(self, request).await?;
        Ok(())
    }
}
