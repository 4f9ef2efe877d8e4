//! Method scheduler: runs the attempts of one method.
//!
//! Attempts are launched in order through a semaphore sized by the attempt
//! pool. With early-stop enabled a success keeps not-yet-started attempts
//! from launching; attempts already in flight finish and persist their
//! records.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::domain::models::{
    AttemptContext, AttemptOutcome, AttemptRecord, AttemptState, ClassDescriptor,
    MethodDescriptor,
};
use crate::services::context::GenerationContext;
use crate::services::job_counters::JobCounters;
use crate::services::naming;
use crate::services::round_executor::RoundExecutor;

/// Result of one method job.
#[derive(Debug, Clone)]
pub struct MethodJobSummary {
    /// Fully-qualified name of the class under test
    pub class_name: String,
    /// Signature of the method under test, e.g. `add(int, int)`
    pub method_signature: String,
    /// One record per attempt that ran to completion
    pub records: Vec<AttemptRecord>,
    /// Set when cancellation stopped the job before it finished
    pub cancelled: bool,
}

impl MethodJobSummary {
    /// Whether any attempt passed.
    pub fn succeeded(&self) -> bool {
        self.records.iter().any(|r| r.success)
    }

    /// Attempts that produced a record.
    pub fn attempts(&self) -> usize {
        self.records.len()
    }
}

/// Schedules the attempts of one method.
pub struct MethodScheduler {
    ctx: GenerationContext,
    class: Arc<ClassDescriptor>,
    method: Arc<MethodDescriptor>,
}

impl MethodScheduler {
    /// Scheduler for the attempts of `method`.
    pub fn new(
        ctx: GenerationContext,
        class: Arc<ClassDescriptor>,
        method: Arc<MethodDescriptor>,
    ) -> Self {
        Self { ctx, class, method }
    }

    /// Run every attempt and bump the job counter once, unless cancelled.
    pub async fn run(&self) -> MethodJobSummary {
        let config = &self.ctx.config;
        let attempts = config.attempts_per_method;
        let stop_on_success = config.stop_when_success;
        let semaphore = Arc::new(Semaphore::new(config.attempt_pool_size()));
        let succeeded = Arc::new(AtomicBool::new(false));

        tracing::debug!(
            class = %self.class.full_name(),
            method = %self.method.signature,
            attempts,
            pool = config.attempt_pool_size(),
            "scheduling attempts"
        );

        let mut handles: Vec<(u32, JoinHandle<Option<AttemptRecord>>)> = Vec::new();
        let mut cancelled = false;

        for attempt in 1..=attempts {
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

            if stop_on_success && succeeded.load(Ordering::SeqCst) {
                tracing::debug!(
                    method = %self.method.signature,
                    remaining = attempts - attempt + 1,
                    "earlier attempt succeeded, skipping remaining attempts"
                );
                break;
            }

            let executor = RoundExecutor::new(self.ctx.clone(), self.class.clone(), self.method.clone());
            let cancel = self.ctx.cancel.clone();
            let succeeded = succeeded.clone();

            let handle = tokio::spawn(async move {
                let record = tokio::select! {
                    () = cancel.cancelled() => None,
                    record = executor.run(attempt) => Some(record),
                };
                if record.as_ref().is_some_and(|r| r.success) {
                    succeeded.store(true, Ordering::SeqCst);
                }
                drop(permit);
                record
            });
            handles.push((attempt, handle));
        }

        let mut records = Vec::with_capacity(handles.len());
        for (attempt, handle) in handles {
            match handle.await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => cancelled = true,
                Err(join_err) => {
                    tracing::error!(
                        class = %self.class.full_name(),
                        method = %self.method.signature,
                        attempt,
                        error = %join_err,
                        "attempt task panicked"
                    );
                    records.push(self.persist_fallback(attempt).await);
                }
            }
        }

        let summary = MethodJobSummary {
            class_name: self.class.full_name(),
            method_signature: self.method.signature.clone(),
            records,
            cancelled,
        };

        if summary.cancelled {
            tracing::warn!(
                class = %summary.class_name,
                method = %summary.method_signature,
                "method job cancelled"
            );
        } else {
            let (completed, total) = self.ctx.counters.complete_one();
            tracing::info!(
                class = %summary.class_name,
                method = %summary.method_signature,
                attempts = summary.attempts(),
                success = summary.succeeded(),
                "{}",
                JobCounters::progress_line(completed, total)
            );
        }

        summary
    }

    /// Record persisted on behalf of an attempt whose task panicked.
    async fn persist_fallback(&self, attempt: u32) -> AttemptRecord {
        let identity = naming::test_identity(&self.ctx.layout, &self.class, &self.method, attempt);
        let mut actx = AttemptContext::new(attempt, identity);
        actx.transition(AttemptState::Exhausted);
        let record = AttemptRecord::from_context(
            &self.class.full_name(),
            &self.method.signature,
            &self.method.method_id,
            &actx,
            AttemptOutcome::Exhausted { rounds: 0 },
            Utc::now(),
        )
        .with_run_id(self.ctx.run_id);

        if let Err(err) = self.ctx.ports.records.persist(&record).await {
            tracing::error!(test = %record.test_name, error = %err, "failed to persist attempt record");
        }
        record
    }
}
