//! Persistence error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Connection error: {0}")]
    Connection(#[from] scylla::transport::errors::NewSessionError),

    #[error("Query error: {0}")]
    Query(#[from] scylla::transport::errors::QueryError),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<PersistenceError> for support_agent_session::SessionError {
    fn from(err: PersistenceError) -> Self {
        support_agent_session::SessionError::Backend(err.to_string())
    }
}

impl From<PersistenceError> for support_agent_core::Error {
    fn from(err: PersistenceError) -> Self {
        support_agent_core::Error::Persistence(err.to_string())
    }
}
