//! Generator port: model call plus code extraction.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::PromptMessages;

/// Produces candidate test source from prompt messages.
///
/// An empty string means the response held no extractable code. Errors are
/// reserved for failures to reach the model at all.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, messages: &PromptMessages) -> DomainResult<String>;
}
