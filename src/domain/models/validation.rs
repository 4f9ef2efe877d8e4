//! Compile and test-execution results for a candidate test.

use serde::{Deserialize, Serialize};

/// Result of compiling a candidate test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOutcome {
    pub success: bool,
    pub error_count: u32,
    /// Compiler error lines, used as repair feedback
    pub errors: Vec<String>,
}

impl CompileOutcome {
    pub fn ok() -> Self {
        Self { success: true, error_count: 0, errors: Vec::new() }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        let error_count = u32::try_from(errors.len()).unwrap_or(u32::MAX);
        Self { success: false, error_count, errors }
    }
}

/// Result of executing a compiled test class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestExecution {
    pub passed: bool,
    pub tests_run: u32,
    pub failed_count: u32,
    /// Assertion and runtime failure messages
    pub diagnostics: Vec<String>,
}

impl TestExecution {
    pub fn passed(tests_run: u32) -> Self {
        Self { passed: true, tests_run, failed_count: 0, diagnostics: Vec::new() }
    }

    pub fn failed(failed_count: u32, diagnostics: Vec<String>) -> Self {
        Self { passed: false, tests_run: failed_count, failed_count, diagnostics }
    }
}

/// Which validation stage rejected a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Compile,
    Execution,
}

/// Structured diagnostics captured from one failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub kind: FailureKind,
    pub round: u32,
    pub messages: Vec<String>,
}

impl ValidationFailure {
    pub fn from_compile(round: u32, outcome: &CompileOutcome) -> Self {
        Self { kind: FailureKind::Compile, round, messages: outcome.errors.clone() }
    }

    pub fn from_execution(round: u32, execution: &TestExecution) -> Self {
        Self { kind: FailureKind::Execution, round, messages: execution.diagnostics.clone() }
    }

    /// Feedback text handed back to the prompt constructor.
    pub fn feedback(&self) -> String {
        let header = match self.kind {
            FailureKind::Compile => "The test failed to compile:",
            FailureKind::Execution => "The test compiled but failed when executed:",
        };
        let mut text = String::from(header);
        for message in &self.messages {
            text.push('\n');
            text.push_str(message);
        }
        text
    }
}
