//! Domain errors for the unitsmith generation pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Format a candidate list as a human-readable string: `a.B, c.B`.
fn format_candidates(candidates: &[String]) -> String {
    candidates.join(", ")
}

/// Domain-level errors that can occur while dispatching or running jobs.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(
        "The project is not compiled to the build directory {}. Build the project first.",
        .0.display()
    )]
    ProjectNotCompiled(PathBuf),

    #[error(
        "Multiple classes named {name}: [{}]. Please use the fully qualified name.",
        format_candidates(.candidates)
    )]
    AmbiguousClassName { name: String, candidates: Vec<String> },

    #[error("Class not found: {0}")]
    ClassNotFound(String),

    #[error("Method {method} not found in class {class}")]
    MethodNotFound { class: String, method: String },

    #[error("No parsed info found for {0}")]
    NoParsedInfo(String),

    #[error("Prompt exceeds the token budget: {tokens} > {max}")]
    PromptTooLarge { tokens: usize, max: usize },

    #[error("Prompt construction produced no messages")]
    EmptyPrompt,

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Suite merge failed: {0}")]
    Merge(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Run cancelled")]
    Cancelled,
}

impl DomainError {
    /// Whether this error aborts the whole invocation rather than a single job.
    pub const fn is_fatal_to_run(&self) -> bool {
        matches!(
            self,
            Self::ProjectNotCompiled(_) | Self::AmbiguousClassName { .. }
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
