//! Attempt record persistence port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::AttemptRecord;

/// Persists the outcome of every attempt.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist one record. Successful candidates also land in the test tree.
    async fn persist(&self, record: &AttemptRecord) -> DomainResult<()>;
}
