//! ScyllaDB schema creation

use scylla::Session;

use crate::error::PersistenceError;

/// Create the keyspace if it doesn't exist
pub async fn create_keyspace(
    session: &Session,
    keyspace: &str,
    replication_factor: u8,
) -> Result<(), PersistenceError> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session
        .query_unpaged(query, &[])
        .await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create keyspace: {}", e)))?;

    Ok(())
}

/// Create all required tables
///
/// Session-scoped tables carry `default_time_to_live` so expired
/// sessions vanish without a reaper process. Timestamps are stored as
/// epoch milliseconds (BIGINT).
pub async fn create_tables(
    session: &Session,
    keyspace: &str,
    session_ttl_secs: u64,
) -> Result<(), PersistenceError> {
    let sessions_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.sessions (
            session_id TEXT,
            created_at BIGINT,
            last_activity BIGINT,
            turn_count INT,
            form_state TEXT,
            form_data_json TEXT,
            PRIMARY KEY (session_id)
        ) WITH default_time_to_live = {}
    "#,
        keyspace, session_ttl_secs
    );

    session
        .query_unpaged(sessions_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::SchemaError(format!("Failed to create sessions table: {}", e))
        })?;

    let history_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.session_history (
            session_id TEXT,
            created_at BIGINT,
            entry_id UUID,
            role TEXT,
            content TEXT,
            PRIMARY KEY ((session_id), created_at, entry_id)
        ) WITH CLUSTERING ORDER BY (created_at ASC, entry_id ASC)
        AND default_time_to_live = {}
    "#,
        keyspace, session_ttl_secs
    );

    session
        .query_unpaged(history_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::SchemaError(format!("Failed to create session_history table: {}", e))
        })?;

    let cache_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.response_cache (
            session_id TEXT,
            query_key TEXT,
            original_query TEXT,
            response TEXT,
            created_at BIGINT,
            PRIMARY KEY ((session_id), query_key)
        ) WITH default_time_to_live = {}
    "#,
        keyspace, session_ttl_secs
    );

    session
        .query_unpaged(cache_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::SchemaError(format!("Failed to create response_cache table: {}", e))
        })?;

    let contacts_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.contact_requests (
            session_id TEXT,
            request_id UUID,
            name TEXT,
            email TEXT,
            mobile TEXT,
            preferred_datetime TEXT,
            timezone TEXT,
            original_query TEXT,
            status TEXT,
            created_at BIGINT,
            PRIMARY KEY ((session_id), request_id)
        )
    "#,
        keyspace
    );

    session
        .query_unpaged(contacts_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::SchemaError(format!("Failed to create contact_requests table: {}", e))
        })?;

    let conversations_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.conversations (
            session_id TEXT,
            saved_at BIGINT,
            history_json TEXT,
            user_details_json TEXT,
            message_count INT,
            PRIMARY KEY ((session_id), saved_at)
        ) WITH CLUSTERING ORDER BY (saved_at DESC)
    "#,
        keyspace
    );

    session
        .query_unpaged(conversations_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::SchemaError(format!("Failed to create conversations table: {}", e))
        })?;

    tracing::info!("All tables created successfully");
    Ok(())
}
