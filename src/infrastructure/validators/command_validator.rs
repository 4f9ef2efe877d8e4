//! Validator that compiles with `javac` and runs the JUnit console launcher.
//!
//! Each candidate is written to its own staging directory, so concurrent
//! validations never share files. Command arguments are templated with the
//! `{file}`, `{dir}`, `{test}` and `{classpath}` placeholders.

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CompileOutcome, TestExecution, TestIdentity, ValidatorConfig};
use crate::domain::ports::Validator;

const CLASSPATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

// ---------------------------------------------------------------------------
// CommandValidator
// ---------------------------------------------------------------------------

/// Compile-then-execute validation through external commands.
pub struct CommandValidator {
    config: ValidatorConfig,
    /// Compiled classes of the project under test
    build_dir: PathBuf,
}

/// Outcome of one external command.
enum RunResult {
    Finished(Output),
    TimedOut,
}

impl CommandValidator {
    pub fn new(config: ValidatorConfig, build_dir: impl Into<PathBuf>) -> Self {
        Self { config, build_dir: build_dir.into() }
    }

    fn classpath(&self) -> String {
        std::iter::once(self.build_dir.display().to_string())
            .chain(self.config.classpath.iter().cloned())
            .collect::<Vec<_>>()
            .join(CLASSPATH_SEPARATOR)
    }

    fn source_file(test: &TestIdentity) -> PathBuf {
        test.staging_dir.join(format!("{}.java", test.test_class))
    }

    /// Substitute placeholders in every argument.
    fn render_args(&self, args: &[String], test: &TestIdentity) -> Vec<String> {
        let file = Self::source_file(test).display().to_string();
        let dir = test.staging_dir.display().to_string();
        let full_name = test.full_name();
        let classpath = self.classpath();
        args.iter()
            .map(|arg| {
                arg.replace("{file}", &file)
                    .replace("{dir}", &dir)
                    .replace("{test}", &full_name)
                    .replace("{classpath}", &classpath)
            })
            .collect()
    }

    async fn run(&self, program: &str, args: Vec<String>, dir: &Path) -> DomainResult<RunResult> {
        let mut cmd = Command::new(program);
        cmd.args(&args).current_dir(dir).kill_on_drop(true);

        let limit = Duration::from_secs(self.config.timeout_secs);
        match timeout(limit, cmd.output()).await {
            Ok(Ok(output)) => Ok(RunResult::Finished(output)),
            Ok(Err(e)) => {
                tracing::error!(program, error = %e, "failed to spawn validation command");
                Err(DomainError::Validation(format!("failed to spawn {program}: {e}")))
            }
            Err(_) => Ok(RunResult::TimedOut),
        }
    }

    /// Extract compiler error lines and the error count.
    ///
    /// Recognizes `File.java:12: error: message` lines and the trailing
    /// `N errors` summary, which is authoritative when present.
    fn parse_compile_errors(stderr: &str) -> (u32, Vec<String>) {
        let mut errors = Vec::new();
        for line in stderr.lines() {
            let trimmed = line.trim();
            if trimmed.contains(": error:") || trimmed.starts_with("error:") {
                errors.push(trimmed.to_string());
            }
        }

        let mut error_count = u32::try_from(errors.len()).unwrap_or(u32::MAX);
        for line in stderr.lines().rev() {
            let trimmed = line.trim();
            let mut words = trimmed.split_whitespace();
            if let (Some(count), Some(word), None) = (words.next(), words.next(), words.next()) {
                if word == "error" || word == "errors" {
                    if let Ok(count) = count.parse::<u32>() {
                        error_count = count;
                        break;
                    }
                }
            }
        }
        (error_count, errors)
    }

    /// Parse the JUnit console launcher summary.
    ///
    /// Recognizes `[ N tests successful ]`, `[ N tests failed ]` and the
    /// `=> exception: message` lines printed for each failure.
    fn parse_execution(stdout: &str, stderr: &str, exit_ok: bool) -> TestExecution {
        let combined = format!("{stdout}\n{stderr}");
        let mut successful = None;
        let mut failed = None;
        let mut diagnostics = Vec::new();

        for line in combined.lines() {
            let trimmed = line.trim().trim_matches(|c: char| c == '│' || c == '|').trim();
            if let Some(count) = Self::summary_count(trimmed, "tests successful") {
                successful = Some(count);
            } else if let Some(count) = Self::summary_count(trimmed, "tests failed") {
                failed = Some(count);
            } else if let Some(rest) = trimmed.strip_prefix("=>") {
                diagnostics.push(rest.trim().to_string());
            }
        }

        let failed = failed.unwrap_or(u32::from(!exit_ok));
        let successful = successful.unwrap_or(0);

        if exit_ok && failed == 0 && successful > 0 {
            return TestExecution::passed(successful);
        }
        if diagnostics.is_empty() {
            diagnostics = combined
                .lines()
                .map(str::trim)
                .filter(|l| l.contains("Exception") || l.contains("Error"))
                .take(20)
                .map(ToString::to_string)
                .collect();
        }
        if successful == 0 && failed == 0 {
            diagnostics.push("no tests were executed".to_string());
        }
        TestExecution {
            passed: false,
            tests_run: successful + failed,
            failed_count: failed.max(1),
            diagnostics,
        }
    }

    /// `[ 3 tests successful ]` -> 3 for keyword `tests successful`.
    fn summary_count(line: &str, keyword: &str) -> Option<u32> {
        let inner = line.strip_prefix('[')?.strip_suffix(']')?.trim();
        let number = inner.strip_suffix(keyword)?.trim();
        number.parse().ok()
    }
}

#[async_trait]
impl Validator for CommandValidator {
    async fn compile(&self, candidate: &str, test: &TestIdentity) -> DomainResult<CompileOutcome> {
        tokio::fs::create_dir_all(&test.staging_dir).await?;
        let file = Self::source_file(test);
        tokio::fs::write(&file, candidate).await?;

        let args = self.render_args(&self.config.compile_args, test);
        let output = match self.run(&self.config.compile_program, args, &test.staging_dir).await? {
            RunResult::Finished(output) => output,
            RunResult::TimedOut => {
                return Err(DomainError::Validation(format!(
                    "compilation of {} timed out after {}s",
                    test.full_name(),
                    self.config.timeout_secs
                )))
            }
        };

        if output.status.success() {
            tracing::debug!(test = %test.full_name(), "compiled");
            return Ok(CompileOutcome::ok());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let (error_count, mut errors) = Self::parse_compile_errors(&format!("{stdout}\n{stderr}"));
        if errors.is_empty() {
            errors.push(stderr.trim().to_string());
        }
        tracing::debug!(test = %test.full_name(), error_count, "compilation failed");
        Ok(CompileOutcome { success: false, error_count: error_count.max(1), errors })
    }

    async fn execute(&self, test: &TestIdentity) -> DomainResult<TestExecution> {
        let args = self.render_args(&self.config.execute_args, test);
        match self.run(&self.config.execute_program, args, &test.staging_dir).await? {
            RunResult::Finished(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                let execution = Self::parse_execution(&stdout, &stderr, output.status.success());
                tracing::debug!(
                    test = %test.full_name(),
                    passed = execution.passed,
                    failed = execution.failed_count,
                    "executed"
                );
                Ok(execution)
            }
            RunResult::TimedOut => Ok(TestExecution::failed(
                1,
                vec![format!(
                    "test execution timed out after {}s; the test may loop forever",
                    self.config.timeout_secs
                )],
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_javac_errors() {
        let stderr = "/s/FooTest.java:5: error: cannot find symbol\n    Bar b;\n    ^\n/s/FooTest.java:9: error: ';' expected\n2 errors\n";
        let (count, errors) = CommandValidator::parse_compile_errors(stderr);
        assert_eq!(count, 2);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].ends_with("cannot find symbol"));
    }

    #[test]
    fn parse_junit_success() {
        let stdout = "\n[         1 containers found      ]\n[         2 tests successful      ]\n[         0 tests failed          ]\n";
        let execution = CommandValidator::parse_execution(stdout, "", true);
        assert!(execution.passed);
        assert_eq!(execution.tests_run, 2);
    }

    #[test]
    fn parse_junit_failure() {
        let stdout = "Failures (1):\n  JUnit Jupiter:FooTest:adds()\n    => org.opentest4j.AssertionFailedError: expected: <2> but was: <3>\n[         0 tests successful      ]\n[         1 tests failed          ]\n";
        let execution = CommandValidator::parse_execution(stdout, "", false);
        assert!(!execution.passed);
        assert_eq!(execution.failed_count, 1);
        assert_eq!(
            execution.diagnostics,
            vec!["org.opentest4j.AssertionFailedError: expected: <2> but was: <3>"]
        );
    }

    #[test]
    fn no_tests_found_is_a_failure() {
        let stdout = "[         0 tests successful      ]\n[         0 tests failed          ]\n";
        let execution = CommandValidator::parse_execution(stdout, "", true);
        assert!(!execution.passed);
        assert!(execution.diagnostics.iter().any(|d| d.contains("no tests")));
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use tempfile::TempDir;

        fn identity(dir: &TempDir) -> TestIdentity {
            TestIdentity {
                package_name: "com.example".into(),
                test_class: "Foo_0_1Test".into(),
                test_file: dir.path().join("tests/com/example/Foo_0_1Test.java"),
                staging_dir: dir.path().join("staging/com/example/Foo_0_1Test"),
            }
        }

        fn validator(compile: &str, execute: &str) -> CommandValidator {
            let config = ValidatorConfig {
                compile_program: "sh".into(),
                compile_args: vec!["-c".into(), compile.into()],
                execute_program: "sh".into(),
                execute_args: vec!["-c".into(), execute.into()],
                classpath: vec!["lib/junit.jar".into()],
                timeout_secs: 10,
            };
            CommandValidator::new(config, "/p/target/classes")
        }

        #[tokio::test]
        async fn compile_stages_source_and_reports_errors() {
            let dir = TempDir::new().unwrap();
            let test = identity(&dir);
            let validator = validator("echo '{file}:3: error: cannot find symbol' >&2; echo '1 error' >&2; exit 1", "true");

            let outcome = validator.compile("class Foo_0_1Test {}", &test).await.unwrap();

            assert!(!outcome.success);
            assert_eq!(outcome.error_count, 1);
            assert!(outcome.errors[0].contains("Foo_0_1Test.java:3: error: cannot find symbol"));
            let staged = test.staging_dir.join("Foo_0_1Test.java");
            assert_eq!(std::fs::read_to_string(staged).unwrap(), "class Foo_0_1Test {}");
        }

        #[tokio::test]
        async fn placeholders_are_substituted() {
            let dir = TempDir::new().unwrap();
            let test = identity(&dir);
            let validator = validator("true", "echo '[ 1 tests successful ]'; test '{test}' = com.example.Foo_0_1Test && test '{classpath}' = /p/target/classes:lib/junit.jar");

            let outcome = validator.compile("class Foo_0_1Test {}", &test).await.unwrap();
            assert!(outcome.success);
            let execution = validator.execute(&test).await.unwrap();
            assert!(execution.passed, "{execution:?}");
        }

        #[tokio::test]
        async fn missing_compiler_is_an_error() {
            let dir = TempDir::new().unwrap();
            let test = identity(&dir);
            let mut validator = validator("true", "true");
            validator.config.compile_program = "unitsmith-no-such-javac".into();
            let err = validator.compile("class X {}", &test).await.unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }
}
