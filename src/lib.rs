//! unitsmith - concurrent, model-driven unit test generation
//!
//! unitsmith generates JUnit tests for a compiled Java project by asking a
//! code-generating model for a candidate, compiling and running it, and
//! feeding diagnostics back until it passes or the round limit is reached.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): descriptors, attempt state, records and
//!   the collaborator ports
//! - **Service Layer** (`services`): the scheduling hierarchy
//!   (`ProjectDispatcher` > `ClassScheduler` > `MethodScheduler` >
//!   `RoundExecutor`)
//! - **Infrastructure Layer** (`infrastructure`): config, logging and the
//!   file-system/process adapters
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use unitsmith::cli::commands::generate::build_context;
//! use unitsmith::{ConfigLoader, GenerationTarget, ProjectDispatcher};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load(None)?;
//!     let summary = ProjectDispatcher::new(build_context(&config))
//!         .dispatch(&GenerationTarget::Project)
//!         .await?;
//!     println!("{} methods succeeded", summary.succeeded_methods());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AttemptOutcome, AttemptRecord, ClassDescriptor, Config, GenerationTarget, LoggingConfig,
    MethodDescriptor, ProjectLayout, RunConfig,
};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    ClassScheduler, Collaborators, DispatchSummary, GenerationContext, MethodScheduler,
    ProjectDispatcher, RoundExecutor,
};
