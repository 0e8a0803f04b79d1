//! Contact-request persistence seam

use async_trait::async_trait;

use crate::{ContactRequest, Result};

/// Where completed contact requests go
///
/// The durable implementation lives in the persistence crate; deployments
/// without one simply don't wire a sink, and completion is logged instead.
#[async_trait]
pub trait ContactRequestSink: Send + Sync {
    async fn create(&self, request: &ContactRequest) -> Result<()>;
}
