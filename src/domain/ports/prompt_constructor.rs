//! Prompt construction port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    ClassDescriptor, MethodDescriptor, PromptMessages, TestIdentity, ValidationFailure,
};

/// Builds the chat messages sent to the generator.
#[async_trait]
pub trait PromptConstructor: Send + Sync {
    /// Initial prompt: class and method info plus dependency context.
    async fn build_initial(
        &self,
        class: &ClassDescriptor,
        method: &MethodDescriptor,
        test: &TestIdentity,
    ) -> DomainResult<PromptMessages>;

    /// Repair prompt: the prior context with the failing candidate and its
    /// diagnostics appended.
    async fn build_with_feedback(
        &self,
        prior: &PromptMessages,
        candidate: &str,
        failure: &ValidationFailure,
    ) -> DomainResult<PromptMessages>;

    /// Token count of a prompt, compared against the configured maximum.
    fn token_count(&self, messages: &PromptMessages) -> usize {
        messages.token_count()
    }
}
