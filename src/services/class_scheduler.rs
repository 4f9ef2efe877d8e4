//! Class scheduler: fans the eligible methods of one class out to a
//! bounded pool of method jobs, then merges the class's tests into a suite.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::domain::models::{ClassDescriptor, MethodDescriptor};
use crate::services::context::GenerationContext;
use crate::services::eligibility::select_methods;
use crate::services::job_counters::JobCounters;
use crate::services::method_scheduler::{MethodJobSummary, MethodScheduler};

/// How a class job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassJobStatus {
    /// Every scheduled method job finished
    Completed,
    /// The class has no parse output; nothing was scheduled
    NoParsedInfo,
    /// Loading descriptors failed or the class job panicked
    Failed(String),
    /// Cancellation stopped the job before every method finished
    Cancelled,
}

/// Result of one class job.
#[derive(Debug, Clone)]
pub struct ClassJobSummary {
    /// Fully-qualified class name
    pub class_name: String,
    pub status: ClassJobStatus,
    /// One summary per scheduled method job, in scheduling order
    pub methods: Vec<MethodJobSummary>,
    /// Signatures rejected by the eligibility filter
    pub skipped: Vec<String>,
    /// Whether a suite was written for the class
    pub merged: bool,
}

impl ClassJobSummary {
    pub(crate) fn empty(class_name: &str, status: ClassJobStatus) -> Self {
        Self {
            class_name: class_name.to_string(),
            status,
            methods: Vec::new(),
            skipped: Vec::new(),
            merged: false,
        }
    }

    /// Method jobs with at least one successful attempt.
    pub fn succeeded_methods(&self) -> usize {
        self.methods.iter().filter(|m| m.succeeded()).count()
    }
}

/// Schedules the method jobs of one class.
#[derive(Clone)]
pub struct ClassScheduler {
    ctx: GenerationContext,
}

impl ClassScheduler {
    /// Scheduler sharing `ctx` across every class it runs.
    pub fn new(ctx: GenerationContext) -> Self {
        Self { ctx }
    }

    /// Load a class by full name and run all of its eligible methods.
    pub async fn run(&self, full_name: &str) -> ClassJobSummary {
        match self.ctx.ports.descriptors.class(full_name).await {
            Ok(Some(class)) => self.run_with(class).await,
            Ok(None) => {
                tracing::warn!(class = %full_name, "No parsed info found for class: {full_name}");
                ClassJobSummary::empty(full_name, ClassJobStatus::NoParsedInfo)
            }
            Err(err) => {
                tracing::error!(class = %full_name, error = %err, "failed to load class descriptor");
                ClassJobSummary::empty(full_name, ClassJobStatus::Failed(err.to_string()))
            }
        }
    }

    /// Run all eligible methods of an already-loaded class.
    pub async fn run_with(&self, class: Arc<ClassDescriptor>) -> ClassJobSummary {
        let full_name = class.full_name();
        let selection = match select_methods(
            self.ctx.ports.descriptors.as_ref(),
            self.ctx.ports.filter.as_ref(),
            &class,
        )
        .await
        {
            Ok(selection) => selection,
            Err(err) => {
                tracing::error!(class = %full_name, error = %err, "failed to load method descriptors");
                return ClassJobSummary::empty(&full_name, ClassJobStatus::Failed(err.to_string()));
            }
        };

        for signature in &selection.missing {
            tracing::warn!(
                class = %full_name,
                method = %signature,
                "No parsed info found for method: {signature} in class: {full_name}"
            );
        }
        for signature in &selection.skipped {
            tracing::info!("Skip method: {signature} in class: {full_name}");
        }

        let mut summary = self.run_methods(class, selection.eligible).await;
        summary.skipped = selection.skipped;
        summary
    }

    /// Run the given methods of `class` through the method pool, then merge.
    pub async fn run_methods(
        &self,
        class: Arc<ClassDescriptor>,
        methods: Vec<Arc<MethodDescriptor>>,
    ) -> ClassJobSummary {
        let full_name = class.full_name();
        let pool = self.ctx.config.method_pool_size();
        let semaphore = Arc::new(Semaphore::new(pool));

        tracing::debug!(class = %full_name, methods = methods.len(), pool, "scheduling method jobs");

        let mut handles = Vec::with_capacity(methods.len());
        let mut cancelled = false;

        for method in methods {
            let permit = tokio::select! {
                biased;
                () = self.ctx.cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let signature = method.signature.clone();
            let scheduler = MethodScheduler::new(self.ctx.clone(), class.clone(), method);
            let handle = tokio::spawn(async move {
                let summary = scheduler.run().await;
                drop(permit);
                summary
            });
            handles.push((signature, handle));
        }

        let (signatures, futures): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        let results = join_all(futures).await;

        let mut method_summaries = Vec::with_capacity(results.len());
        for (signature, result) in signatures.into_iter().zip(results) {
            match result {
                Ok(summary) => {
                    cancelled |= summary.cancelled;
                    method_summaries.push(summary);
                }
                Err(join_err) => {
                    let (completed, total) = self.ctx.counters.complete_one();
                    tracing::error!(
                        class = %full_name,
                        method = %signature,
                        error = %join_err,
                        "method job panicked; {}",
                        JobCounters::progress_line(completed, total)
                    );
                    method_summaries.push(MethodJobSummary {
                        class_name: full_name.clone(),
                        method_signature: signature,
                        records: Vec::new(),
                        cancelled: false,
                    });
                }
            }
        }

        let merged = if cancelled || !self.ctx.config.enable_merge {
            false
        } else {
            self.merge(&class).await
        };

        ClassJobSummary {
            class_name: full_name,
            status: if cancelled { ClassJobStatus::Cancelled } else { ClassJobStatus::Completed },
            methods: method_summaries,
            skipped: Vec::new(),
            merged,
        }
    }

    async fn merge(&self, class: &ClassDescriptor) -> bool {
        match self.ctx.ports.merger.merge(class).await {
            Ok(true) => {
                tracing::info!(class = %class.full_name(), "merged generated tests into suite");
                true
            }
            Ok(false) => {
                tracing::info!(class = %class.full_name(), "no generated tests to merge");
                false
            }
            Err(err) => {
                tracing::warn!(class = %class.full_name(), error = %err, "suite merge failed");
                false
            }
        }
    }
}
