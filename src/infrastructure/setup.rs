//! Project initialization
//!
//! `unitsmith init` creates the `.unitsmith/` directory with a commented
//! default `config.yaml` and a `.gitignore` for the scratch directories.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::config::loader::CONFIG_DIR;

/// Default configuration template content
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# unitsmith configuration
# Override settings by editing this file, adding .unitsmith/local.yaml,
# or setting environment variables with the UNITSMITH_ prefix.
#
# Example environment variables:
#   export UNITSMITH_RUN__MAX_ROUNDS=5
#   export UNITSMITH_RUN__STOP_WHEN_SUCCESS=false
#   export UNITSMITH_LOGGING__LEVEL=debug

run:
  # Run jobs concurrently; false forces one worker per pool
  enable_multithreading: true
  # Concurrent classes (project mode), methods per class, attempts per method
  class_threads: 2
  method_threads: 4
  attempt_threads: 1
  # Independent attempts per method
  attempts_per_method: 5
  # Validation rounds per attempt, initial validation included
  max_rounds: 3
  # Stop launching attempts for a method after the first success
  stop_when_success: true
  # Write a <Class>Suite.java selecting every generated test of a class
  enable_merge: true
  # Prompts estimated above this many tokens are skipped
  max_prompt_tokens: 8000

project:
  root: "."
  artifact_id: "project"
  # jar, war or pom (pom projects are skipped)
  packaging: "jar"
  build_dir: "target/classes"
  source_roots:
    - "src/main/java"
  parse_output: ".unitsmith/parsed"
  test_output: "unitsmith-tests"
  staging_dir: ".unitsmith/staging"
  records_dir: ".unitsmith/records"
  # Command producing the parse output; {root} and {output} are substituted
  parser_command: []

generator:
  # Receives the prompt on stdin and prints the reply on stdout
  program: "claude"
  args: ["--print"]
  timeout_secs: 300

validator:
  # {file}, {dir}, {test} and {classpath} are substituted
  compile_program: "javac"
  compile_args: ["-d", "{dir}", "-cp", "{classpath}", "{file}"]
  execute_program: "java"
  execute_args:
    - "-jar"
    - "junit-platform-console-standalone.jar"
    - "--class-path"
    - "{dir}:{classpath}"
    - "--select-class"
    - "{test}"
    - "--details=summary"
  classpath: []
  timeout_secs: 120

logging:
  # trace, debug, info, warn, error
  level: "info"
  # json or pretty
  format: "pretty"
  # Directory for daily-rolling JSON log files (optional)
  # log_dir: ".unitsmith/logs"
"#;

const GITIGNORE: &str = "parsed/\nstaging/\nrecords/\nlogs/\nlocal.yaml\n";

/// Setup paths and directories
pub struct SetupPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub gitignore_file: PathBuf,
}

impl SetupPaths {
    /// Setup paths for the current directory
    pub fn new() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self::in_dir(&current_dir))
    }

    pub fn in_dir(dir: &Path) -> Self {
        let config_dir = dir.join(CONFIG_DIR);
        Self {
            config_file: config_dir.join("config.yaml"),
            gitignore_file: config_dir.join(".gitignore"),
            config_dir,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.config_file.exists()
    }
}

/// What [`initialize`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub config_file: PathBuf,
    /// False when an existing config was kept
    pub wrote_config: bool,
}

/// Create `.unitsmith/` with the default config. An existing config file
/// is only replaced when `force` is set.
pub fn initialize(paths: &SetupPaths, force: bool) -> Result<InitReport> {
    fs::create_dir_all(&paths.config_dir).context("Failed to create config directory")?;

    let wrote_config = !paths.config_file.exists() || force;
    if wrote_config {
        fs::write(&paths.config_file, DEFAULT_CONFIG_TEMPLATE)
            .context("Failed to write config file")?;
    }
    if !paths.gitignore_file.exists() {
        fs::write(&paths.gitignore_file, GITIGNORE).context("Failed to write .gitignore")?;
    }

    Ok(InitReport { config_file: paths.config_file.clone(), wrote_config })
}
