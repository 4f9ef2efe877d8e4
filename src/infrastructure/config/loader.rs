use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local configuration directory
pub const CONFIG_DIR: &str = ".unitsmith";

/// Prefix of environment overrides; `__` separates nested keys
pub const ENV_PREFIX: &str = "UNITSMITH_";

/// Above this many concurrent attempts a warning is logged.
pub const CONCURRENCY_WARN_THRESHOLD: usize = 64;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {0}: must be at least 1")]
    ZeroPoolSize(&'static str),

    #[error("Invalid attempts_per_method: must be at least 1")]
    ZeroAttempts,

    #[error("Invalid max_rounds: must be at least 1")]
    ZeroRounds,

    #[error("Invalid max_prompt_tokens: must be at least 1")]
    ZeroPromptTokens,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("{0} program cannot be empty")]
    EmptyProgram(&'static str),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the current directory.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .unitsmith/config.yaml (project config, created by init)
    /// 3. .unitsmith/local.yaml (local overrides, optional)
    /// 4. `explicit` file, when given (`--config`)
    /// 5. Environment variables (UNITSMITH_* prefix)
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        Self::load_in(Path::new("."), explicit)
    }

    /// Same as [`load`](Self::load) with the config directory resolved
    /// against `dir`.
    pub fn load_in(dir: &Path, explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
        }

        let config: Config = Self::figment(dir, explicit)
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, ignoring the environment.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment(dir: &Path, explicit: Option<&Path>) -> Figment {
        let config_dir = dir.join(CONFIG_DIR);
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(config_dir.join("config.yaml")))
            .merge(Yaml::file(config_dir.join("local.yaml")));
        if let Some(path) = explicit {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let run = &config.run;
        for (name, size) in [
            ("class_threads", run.class_threads),
            ("method_threads", run.method_threads),
            ("attempt_threads", run.attempt_threads),
        ] {
            if size == 0 {
                return Err(ConfigError::ZeroPoolSize(name));
            }
        }
        if run.attempts_per_method == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if run.max_rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        if run.max_prompt_tokens == 0 {
            return Err(ConfigError::ZeroPromptTokens);
        }

        if config.generator.program.trim().is_empty() {
            return Err(ConfigError::EmptyProgram("generator"));
        }
        if config.validator.compile_program.trim().is_empty() {
            return Err(ConfigError::EmptyProgram("compile"));
        }
        if config.validator.execute_program.trim().is_empty() {
            return Err(ConfigError::EmptyProgram("execute"));
        }
        if config.project.source_roots.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "project.source_roots cannot be empty".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let concurrent = run.max_concurrent_attempts();
        if concurrent > CONCURRENCY_WARN_THRESHOLD {
            tracing::warn!(
                concurrent,
                threshold = CONCURRENCY_WARN_THRESHOLD,
                "class_threads x method_threads x attempt_threads allows {concurrent} concurrent \
                 compiles and model calls"
            );
        }

        Ok(())
    }
}
