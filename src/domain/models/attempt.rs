//! Per-attempt state, outcomes and persisted records.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::prompt::PromptMessages;
use super::validation::ValidationFailure;

/// Where a generated test class lives for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestIdentity {
    /// Package the test class is declared in
    pub package_name: String,
    /// Simple test class name, e.g. `Calculator_0_1Test`
    pub test_class: String,
    /// Final location in the test source tree
    pub test_file: PathBuf,
    /// Scratch directory the validator compiles into
    pub staging_dir: PathBuf,
}

impl TestIdentity {
    /// Package-qualified test class name.
    pub fn full_name(&self) -> String {
        if self.package_name.is_empty() {
            self.test_class.clone()
        } else {
            format!("{}.{}", self.package_name, self.test_class)
        }
    }
}

/// States of the round state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    Preparing,
    Generating,
    Validating,
    Repairing,
    Success,
    Exhausted,
    Aborted,
}

impl AttemptState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Exhausted | Self::Aborted)
    }
}

/// Mutable generation context owned by exactly one attempt.
#[derive(Debug, Clone)]
pub struct AttemptContext {
    /// One-based attempt number within the method job
    pub attempt: u32,
    round: u32,
    pub state: AttemptState,
    pub identity: TestIdentity,
    /// Current candidate test source, empty until generated
    pub candidate: String,
    /// Prompt of the latest generator call
    pub messages: PromptMessages,
    /// Diagnostics of the most recent failed validation
    pub last_failure: Option<ValidationFailure>,
    /// Number of validator invocations so far
    pub validations: u32,
}

impl AttemptContext {
    pub fn new(attempt: u32, identity: TestIdentity) -> Self {
        Self {
            attempt,
            round: 0,
            state: AttemptState::Preparing,
            identity,
            candidate: String::new(),
            messages: PromptMessages::default(),
            last_failure: None,
            validations: 0,
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Move to the next repair round. Round numbers only ever grow.
    pub fn next_round(&mut self) -> u32 {
        self.round += 1;
        self.round
    }

    pub fn transition(&mut self, state: AttemptState) {
        tracing::trace!(
            test = %self.identity.test_class,
            attempt = self.attempt,
            round = self.round,
            from = ?self.state,
            to = ?state,
            "attempt state transition"
        );
        self.state = state;
    }
}

/// Terminal outcome of one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Candidate compiled and every test passed
    Success { rounds: u32 },
    /// Round limit reached without a passing candidate
    Exhausted { rounds: u32 },
    /// Attempt stopped before the repair loop could finish
    Aborted { reason: String },
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn rounds(&self) -> u32 {
        match self {
            Self::Success { rounds } | Self::Exhausted { rounds } => *rounds,
            Self::Aborted { .. } => 0,
        }
    }
}

/// Persisted outcome of one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: Uuid,
    /// Dispatch this attempt belonged to
    pub run_id: Uuid,
    pub class_name: String,
    pub method_signature: String,
    pub method_id: String,
    pub attempt: u32,
    pub test_name: String,
    pub test_file: PathBuf,
    /// Final (best-known) candidate source
    pub candidate: String,
    pub success: bool,
    /// Validator invocations performed
    pub rounds: u32,
    pub outcome: AttemptOutcome,
    #[serde(default)]
    pub diagnostics: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl AttemptRecord {
    /// Build the record for a finished attempt context.
    pub fn from_context(
        class_name: &str,
        method_signature: &str,
        method_id: &str,
        ctx: &AttemptContext,
        outcome: AttemptOutcome,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            run_id: Uuid::nil(),
            class_name: class_name.to_string(),
            method_signature: method_signature.to_string(),
            method_id: method_id.to_string(),
            attempt: ctx.attempt,
            test_name: ctx.identity.full_name(),
            test_file: ctx.identity.test_file.clone(),
            candidate: ctx.candidate.clone(),
            success: outcome.is_success(),
            rounds: ctx.validations,
            diagnostics: ctx
                .last_failure
                .as_ref()
                .map(|f| f.messages.clone())
                .unwrap_or_default(),
            outcome,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> TestIdentity {
        TestIdentity {
            package_name: "com.example".into(),
            test_class: "Calculator_0_0Test".into(),
            test_file: PathBuf::from("tests/com/example/Calculator_0_0Test.java"),
            staging_dir: PathBuf::from("staging/com/example/Calculator_0_0Test"),
        }
    }

    #[test]
    fn context_starts_at_round_zero() {
        let mut ctx = AttemptContext::new(3, identity());
        assert_eq!(ctx.round(), 0);
        assert_eq!(ctx.state, AttemptState::Preparing);
        assert_eq!(ctx.next_round(), 1);
        assert_eq!(ctx.next_round(), 2);
        assert_eq!(ctx.round(), 2);
    }

    #[test]
    fn identity_full_name() {
        assert_eq!(identity().full_name(), "com.example.Calculator_0_0Test");
    }

    #[test]
    fn record_reflects_outcome() {
        let mut ctx = AttemptContext::new(1, identity());
        ctx.candidate = "class X {}".into();
        ctx.validations = 2;
        let record = AttemptRecord::from_context(
            "com.example.Calculator",
            "add(int, int)",
            "0",
            &ctx,
            AttemptOutcome::Exhausted { rounds: 2 },
            Utc::now(),
        );
        assert!(!record.success);
        assert_eq!(record.rounds, 2);
        assert_eq!(record.attempt, 1);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["outcome"]["status"], "exhausted");
    }

    #[test]
    fn terminal_states() {
        assert!(AttemptState::Success.is_terminal());
        assert!(AttemptState::Aborted.is_terminal());
        assert!(!AttemptState::Repairing.is_terminal());
    }
}
