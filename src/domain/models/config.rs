use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure for unitsmith
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Scheduling and round configuration
    #[serde(default)]
    pub run: RunConfig,

    /// Project under test
    #[serde(default)]
    pub project: ProjectConfig,

    /// External generator command
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// External compile/execute commands
    #[serde(default)]
    pub validator: ValidatorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Run configuration shared read-only by every scheduler level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunConfig {
    /// Run jobs concurrently; when false every pool has a single worker
    #[serde(default = "default_true")]
    pub enable_multithreading: bool,

    /// Concurrent class jobs in whole-project mode
    #[serde(default = "default_class_threads")]
    pub class_threads: usize,

    /// Concurrent method jobs per class
    #[serde(default = "default_method_threads")]
    pub method_threads: usize,

    /// Concurrent attempts per method
    #[serde(default = "default_attempt_threads")]
    pub attempt_threads: usize,

    /// Independent attempts per method
    #[serde(default = "default_attempts_per_method")]
    pub attempts_per_method: u32,

    /// Validation rounds per attempt (initial validation included)
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Stop launching attempts for a method once one succeeds
    #[serde(default = "default_true")]
    pub stop_when_success: bool,

    /// Merge per-method tests into a suite after each class
    #[serde(default = "default_true")]
    pub enable_merge: bool,

    /// Prompt token budget; larger prompts abort the attempt
    #[serde(default = "default_max_prompt_tokens")]
    pub max_prompt_tokens: usize,
}

const fn default_true() -> bool {
    true
}

const fn default_class_threads() -> usize {
    2
}

const fn default_method_threads() -> usize {
    4
}

const fn default_attempt_threads() -> usize {
    1
}

const fn default_attempts_per_method() -> u32 {
    5
}

const fn default_max_rounds() -> u32 {
    3
}

const fn default_max_prompt_tokens() -> usize {
    8000
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            enable_multithreading: default_true(),
            class_threads: default_class_threads(),
            method_threads: default_method_threads(),
            attempt_threads: default_attempt_threads(),
            attempts_per_method: default_attempts_per_method(),
            max_rounds: default_max_rounds(),
            stop_when_success: default_true(),
            enable_merge: default_true(),
            max_prompt_tokens: default_max_prompt_tokens(),
        }
    }
}

impl RunConfig {
    /// Effective class pool size.
    pub fn class_pool_size(&self) -> usize {
        self.pool_size(self.class_threads)
    }

    /// Effective method pool size.
    pub fn method_pool_size(&self) -> usize {
        self.pool_size(self.method_threads)
    }

    /// Effective attempt pool size.
    pub fn attempt_pool_size(&self) -> usize {
        self.pool_size(self.attempt_threads)
    }

    fn pool_size(&self, configured: usize) -> usize {
        if self.enable_multithreading {
            configured.max(1)
        } else {
            1
        }
    }

    /// Upper bound on concurrently running attempts across all levels.
    pub fn max_concurrent_attempts(&self) -> usize {
        self.class_pool_size() * self.method_pool_size() * self.attempt_pool_size()
    }
}

/// Project under test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProjectConfig {
    /// Project root directory
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Artifact id, used in log messages
    #[serde(default = "default_artifact_id")]
    pub artifact_id: String,

    /// Packaging type: jar, war, pom
    #[serde(default = "default_packaging")]
    pub packaging: String,

    /// Compiled classes directory
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Source roots scanned in whole-project mode
    #[serde(default = "default_source_roots")]
    pub source_roots: Vec<PathBuf>,

    /// Parser output directory
    #[serde(default = "default_parse_output")]
    pub parse_output: PathBuf,

    /// Directory receiving generated test sources
    #[serde(default = "default_test_output")]
    pub test_output: PathBuf,

    /// Scratch directory for compiling candidates
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// Directory receiving attempt records
    #[serde(default = "default_records_dir")]
    pub records_dir: PathBuf,

    /// Command that produces the parse output when it does not exist yet
    #[serde(default)]
    pub parser_command: Vec<String>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_artifact_id() -> String {
    "project".to_string()
}

fn default_packaging() -> String {
    "jar".to_string()
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("target/classes")
}

fn default_source_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("src/main/java")]
}

fn default_parse_output() -> PathBuf {
    PathBuf::from(".unitsmith/parsed")
}

fn default_test_output() -> PathBuf {
    PathBuf::from("unitsmith-tests")
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from(".unitsmith/staging")
}

fn default_records_dir() -> PathBuf {
    PathBuf::from(".unitsmith/records")
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            artifact_id: default_artifact_id(),
            packaging: default_packaging(),
            build_dir: default_build_dir(),
            source_roots: default_source_roots(),
            parse_output: default_parse_output(),
            test_output: default_test_output(),
            staging_dir: default_staging_dir(),
            records_dir: default_records_dir(),
            parser_command: Vec::new(),
        }
    }
}

/// External generator command. The prompt is written to stdin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GeneratorConfig {
    #[serde(default = "default_generator_program")]
    pub program: String,

    #[serde(default = "default_generator_args")]
    pub args: Vec<String>,

    #[serde(default = "default_generator_timeout")]
    pub timeout_secs: u64,
}

fn default_generator_program() -> String {
    "claude".to_string()
}

fn default_generator_args() -> Vec<String> {
    vec!["--print".to_string()]
}

const fn default_generator_timeout() -> u64 {
    300
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: default_generator_program(),
            args: default_generator_args(),
            timeout_secs: default_generator_timeout(),
        }
    }
}

/// External compile and execute commands.
///
/// Arguments may contain `{file}`, `{dir}`, `{test}` and `{classpath}`
/// placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ValidatorConfig {
    #[serde(default = "default_compile_program")]
    pub compile_program: String,

    #[serde(default = "default_compile_args")]
    pub compile_args: Vec<String>,

    #[serde(default = "default_execute_program")]
    pub execute_program: String,

    #[serde(default = "default_execute_args")]
    pub execute_args: Vec<String>,

    /// Classpath entries joined into `{classpath}`
    #[serde(default)]
    pub classpath: Vec<String>,

    #[serde(default = "default_validator_timeout")]
    pub timeout_secs: u64,
}

fn default_compile_program() -> String {
    "javac".to_string()
}

fn default_compile_args() -> Vec<String> {
    ["-d", "{dir}", "-cp", "{classpath}", "{file}"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_execute_program() -> String {
    "java".to_string()
}

fn default_execute_args() -> Vec<String> {
    [
        "-jar",
        "junit-platform-console-standalone.jar",
        "--class-path",
        "{dir}:{classpath}",
        "--select-class",
        "{test}",
        "--details=summary",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

const fn default_validator_timeout() -> u64 {
    120
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            compile_program: default_compile_program(),
            compile_args: default_compile_args(),
            execute_program: default_execute_program(),
            execute_args: default_execute_args(),
            classpath: Vec::new(),
            timeout_secs: default_validator_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling JSON log files
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_mode_collapses_pools() {
        let run = RunConfig {
            enable_multithreading: false,
            class_threads: 8,
            method_threads: 8,
            attempt_threads: 8,
            ..RunConfig::default()
        };
        assert_eq!(run.class_pool_size(), 1);
        assert_eq!(run.method_pool_size(), 1);
        assert_eq!(run.attempt_pool_size(), 1);
        assert_eq!(run.max_concurrent_attempts(), 1);
    }

    #[test]
    fn concurrent_product() {
        let run = RunConfig {
            class_threads: 2,
            method_threads: 3,
            attempt_threads: 4,
            ..RunConfig::default()
        };
        assert_eq!(run.max_concurrent_attempts(), 24);
    }

    #[test]
    fn default_commands_use_placeholders() {
        let validator = ValidatorConfig::default();
        assert!(validator.compile_args.iter().any(|a| a == "{file}"));
        assert!(validator.execute_args.iter().any(|a| a == "{test}"));
    }
}
