//! Suite merge port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::ClassDescriptor;

/// Combines the per-method test files of a class into one suite.
#[async_trait]
pub trait TestClassMerger: Send + Sync {
    /// Returns `Ok(false)` when there was nothing to merge.
    async fn merge(&self, class: &ClassDescriptor) -> DomainResult<bool>;
}
