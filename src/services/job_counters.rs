//! Process-wide progress counters for method jobs.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Completed/total method job counters shared by every worker.
///
/// `total` is set once before dispatch; `completed` is bumped exactly once
/// per finished method job and never exceeds `total`.
#[derive(Debug, Default)]
pub struct JobCounters {
    completed: AtomicUsize,
    total: AtomicUsize,
}

impl JobCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new dispatch with `total` expected method jobs.
    pub fn start(&self, total: usize) {
        self.completed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
    }

    /// Record one finished method job, returning `(completed, total)`.
    pub fn complete_one(&self) -> (usize, usize) {
        let total = self.total.load(Ordering::SeqCst);
        let completed = match self.completed.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| {
            (c < total).then_some(c + 1)
        }) {
            Ok(previous) => previous + 1,
            Err(current) => {
                tracing::warn!(
                    completed = current,
                    total,
                    "method job finished beyond the counted total"
                );
                current
            }
        };
        (completed, total)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Progress line in the `Completed Method Jobs: [ n / total ]` form.
    pub fn progress_line(completed: usize, total: usize) -> String {
        format!("Completed Method Jobs: [ {completed} / {total} ]")
    }
}
