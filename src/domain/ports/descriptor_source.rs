//! Parser port: access to parsed class and method descriptors.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ClassDescriptor, MethodDescriptor};

/// Source of parsed descriptors.
///
/// Implementations must be idempotent: calling [`prepare`](Self::prepare)
/// on an already-parsed project reuses the prior output.
#[async_trait]
pub trait DescriptorSource: Send + Sync {
    /// Make sure parse output exists, running the parser if needed.
    async fn prepare(&self) -> DomainResult<()>;

    /// Load the descriptor of a fully-qualified class, `None` if not parsed.
    async fn class(&self, full_name: &str) -> DomainResult<Option<Arc<ClassDescriptor>>>;

    /// Load a method descriptor by signature, `None` if not parsed.
    async fn method(
        &self,
        class: &ClassDescriptor,
        signature: &str,
    ) -> DomainResult<Option<Arc<MethodDescriptor>>>;

    /// Fully-qualified names of every parsed class with this simple name.
    async fn classes_named(&self, simple_name: &str) -> DomainResult<Vec<String>>;
}
