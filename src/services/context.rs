//! Shared generation context handed to every worker.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::models::{ProjectLayout, RunConfig};
use crate::domain::ports::{
    DescriptorSource, EligibilityFilter, Generator, Obfuscator, PromptConstructor, RecordStore,
    TestClassMerger, Validator,
};
use crate::services::job_counters::JobCounters;

/// The external collaborators the pipeline is written against.
#[derive(Clone)]
pub struct Collaborators {
    pub descriptors: Arc<dyn DescriptorSource>,
    pub prompts: Arc<dyn PromptConstructor>,
    pub generator: Arc<dyn Generator>,
    pub validator: Arc<dyn Validator>,
    pub merger: Arc<dyn TestClassMerger>,
    pub filter: Arc<dyn EligibilityFilter>,
    pub records: Arc<dyn RecordStore>,
    pub obfuscator: Arc<dyn Obfuscator>,
}

/// Read-only configuration, collaborators, counters and the cancellation
/// token of one run. Cloning is cheap; every field is shared.
#[derive(Clone)]
pub struct GenerationContext {
    pub run_id: Uuid,
    pub config: Arc<RunConfig>,
    pub layout: Arc<ProjectLayout>,
    pub ports: Collaborators,
    pub counters: Arc<JobCounters>,
    pub cancel: CancellationToken,
}

impl GenerationContext {
    pub fn new(config: RunConfig, layout: ProjectLayout, ports: Collaborators) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            config: Arc::new(config),
            layout: Arc::new(layout),
            ports,
            counters: Arc::new(JobCounters::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token (e.g. wired to Ctrl-C).
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
