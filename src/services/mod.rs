//! Service layer: the generation pipeline.
//!
//! - ProjectDispatcher: target resolution and the class pool
//! - ClassScheduler: the method pool of one class and suite merge
//! - MethodScheduler: the attempts of one method
//! - RoundExecutor: the validate/repair state machine of one attempt

pub mod class_scheduler;
pub mod context;
pub mod eligibility;
pub mod job_counters;
pub mod method_scheduler;
pub mod naming;
pub mod project_dispatcher;
pub mod repair;
pub mod round_executor;

#[cfg(test)]
pub(crate) mod test_support;

pub use class_scheduler::{ClassJobStatus, ClassJobSummary, ClassScheduler};
pub use context::{Collaborators, GenerationContext};
pub use job_counters::JobCounters;
pub use method_scheduler::{MethodJobSummary, MethodScheduler};
pub use project_dispatcher::{DispatchSummary, ProjectDispatcher};
pub use round_executor::RoundExecutor;
