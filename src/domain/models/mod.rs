pub mod attempt;
pub mod config;
pub mod descriptor;
pub mod project;
pub mod prompt;
pub mod validation;

pub use attempt::{AttemptContext, AttemptOutcome, AttemptRecord, AttemptState, TestIdentity};
pub use config::{
    Config, GeneratorConfig, LoggingConfig, ProjectConfig, RunConfig, ValidatorConfig,
};
pub use descriptor::{ClassDescriptor, MethodDescriptor};
pub use project::{GenerationTarget, Packaging, ProjectLayout};
pub use prompt::{ChatMessage, PromptMessages, Role};
pub use validation::{CompileOutcome, FailureKind, TestExecution, ValidationFailure};
