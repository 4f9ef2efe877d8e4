//! Implementation of the `method`, `class` and `project` commands.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use uuid::Uuid;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, GenerationTarget, ProjectLayout};
use crate::domain::ports::NullObfuscator;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::filter::DefaultEligibilityFilter;
use crate::infrastructure::generator::CommandGenerator;
use crate::infrastructure::logging::LoggerImpl;
use crate::infrastructure::merger::JunitSuiteMerger;
use crate::infrastructure::parser::JsonDescriptorStore;
use crate::infrastructure::prompt::TemplatePromptConstructor;
use crate::infrastructure::records::FileRecordStore;
use crate::infrastructure::validators::CommandValidator;
use crate::services::{
    ClassJobStatus, ClassJobSummary, Collaborators, DispatchSummary, GenerationContext,
    MethodJobSummary, ProjectDispatcher,
};

#[derive(Debug, Serialize)]
pub struct MethodOutput {
    pub signature: String,
    pub attempts: usize,
    pub succeeded: bool,
    /// Test classes whose candidates passed
    pub tests: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ClassOutput {
    pub class_name: String,
    pub status: String,
    pub methods: Vec<MethodOutput>,
    pub skipped: Vec<String>,
    pub merged: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateOutput {
    pub run_id: Uuid,
    pub target: String,
    pub skipped: Option<String>,
    pub total_jobs: usize,
    pub completed_jobs: usize,
    pub succeeded_methods: usize,
    pub attempts: usize,
    pub cancelled: bool,
    pub classes: Vec<ClassOutput>,
}

impl From<&MethodJobSummary> for MethodOutput {
    fn from(summary: &MethodJobSummary) -> Self {
        Self {
            signature: summary.method_signature.clone(),
            attempts: summary.attempts(),
            succeeded: summary.succeeded(),
            tests: summary
                .records
                .iter()
                .filter(|r| r.success)
                .map(|r| r.test_name.clone())
                .collect(),
        }
    }
}

impl From<&ClassJobSummary> for ClassOutput {
    fn from(summary: &ClassJobSummary) -> Self {
        let status = match &summary.status {
            ClassJobStatus::Completed => "completed".to_string(),
            ClassJobStatus::NoParsedInfo => "no_parsed_info".to_string(),
            ClassJobStatus::Failed(reason) => format!("failed: {reason}"),
            ClassJobStatus::Cancelled => "cancelled".to_string(),
        };
        Self {
            class_name: summary.class_name.clone(),
            status,
            methods: summary.methods.iter().map(MethodOutput::from).collect(),
            skipped: summary.skipped.clone(),
            merged: summary.merged,
        }
    }
}

impl GenerateOutput {
    pub fn new(run_id: Uuid, summary: &DispatchSummary) -> Self {
        Self {
            run_id,
            target: summary.target.clone(),
            skipped: summary.skipped.clone(),
            total_jobs: summary.total_jobs,
            completed_jobs: summary.completed_jobs,
            succeeded_methods: summary.succeeded_methods(),
            attempts: summary.attempts(),
            cancelled: summary.cancelled,
            classes: summary.classes.iter().map(ClassOutput::from).collect(),
        }
    }
}

impl CommandOutput for GenerateOutput {
    fn to_human(&self) -> String {
        if let Some(reason) = &self.skipped {
            return format!("Skipped {}: {reason}", self.target);
        }
        let mut lines = vec![format!(
            "Generation {} for {}: {}/{} method jobs completed, {} succeeded, {} attempts",
            if self.cancelled { "cancelled" } else { "finished" },
            self.target,
            self.completed_jobs,
            self.total_jobs,
            self.succeeded_methods,
            self.attempts,
        )];
        for class in &self.classes {
            lines.push(format!("  {} ({})", class.class_name, class.status));
            for method in &class.methods {
                let mark = if method.succeeded { "ok" } else { "--" };
                lines.push(format!(
                    "    [{mark}] {} ({} attempts) {}",
                    method.signature,
                    method.attempts,
                    method.tests.join(", ")
                ));
            }
        }
        lines.join("\n")
    }
}

/// Wire the file-system and process adapters for `config`.
pub fn build_context(config: &Config) -> GenerationContext {
    let layout = ProjectLayout::from_config(&config.project);
    let ports = Collaborators {
        descriptors: Arc::new(JsonDescriptorStore::new(
            &layout.parse_output,
            &layout.root,
            config.project.parser_command.clone(),
        )),
        prompts: Arc::new(TemplatePromptConstructor::new()),
        generator: Arc::new(CommandGenerator::new(config.generator.clone())),
        validator: Arc::new(CommandValidator::new(config.validator.clone(), &layout.build_dir)),
        merger: Arc::new(JunitSuiteMerger::new(&layout.test_output)),
        filter: Arc::new(DefaultEligibilityFilter::new()),
        records: Arc::new(FileRecordStore::new(&layout.records_dir)),
        obfuscator: Arc::new(NullObfuscator::new()),
    };
    GenerationContext::new(config.run.clone(), layout, ports)
}

pub async fn execute(
    target: GenerationTarget,
    config_path: Option<&Path>,
    json_mode: bool,
) -> Result<()> {
    let config = ConfigLoader::load(config_path).context("Failed to load configuration")?;
    let _logger = LoggerImpl::init(&config.logging).context("Failed to initialize logging")?;

    let ctx = build_context(&config);
    let run_id = ctx.run_id;
    let cancel = ctx.cancel.clone();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling outstanding jobs");
            cancel.cancel();
        }
    });

    tracing::info!(
        run_id = %run_id,
        target = %target.describe(),
        artifact = %config.project.artifact_id,
        "Starting generation"
    );
    let result = ProjectDispatcher::new(ctx).dispatch(&target).await;
    signal.abort();

    let summary = result?;
    output(&GenerateOutput::new(run_id, &summary), json_mode);
    Ok(())
}
