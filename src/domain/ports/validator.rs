//! Validator port: compile then execute a candidate test.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{CompileOutcome, TestExecution, TestIdentity};

/// Compiles and runs candidate tests.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Write `candidate` for `test` into its staging location and compile it.
    /// Compile errors are reported in the outcome, not as `Err`.
    async fn compile(&self, candidate: &str, test: &TestIdentity) -> DomainResult<CompileOutcome>;

    /// Run a previously compiled test class.
    async fn execute(&self, test: &TestIdentity) -> DomainResult<TestExecution>;
}
