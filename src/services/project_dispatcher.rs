//! Project dispatcher: resolves a generation target into class and method
//! jobs and fans them out to a bounded class pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use walkdir::WalkDir;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::descriptor::is_full_name;
use crate::domain::models::{ClassDescriptor, GenerationTarget, MethodDescriptor};
use crate::services::class_scheduler::{ClassJobStatus, ClassJobSummary, ClassScheduler};
use crate::services::context::GenerationContext;
use crate::services::eligibility::{count_eligible_methods, select_methods};

const SKIPPED_SOURCE_FILES: [&str; 2] = ["package-info.java", "module-info.java"];

/// Result of one dispatch.
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    /// Human-readable description of the target
    pub target: String,
    /// Set when the whole project was skipped (e.g. an aggregator)
    pub skipped: Option<String>,
    /// Eligible method jobs the target expanded to
    pub total_jobs: usize,
    /// Method jobs that finished, including failed and panicked ones
    pub completed_jobs: usize,
    /// Class jobs in launch order
    pub classes: Vec<ClassJobSummary>,
    /// Set when cancellation cut the run short
    pub cancelled: bool,
}

impl DispatchSummary {
    fn new(target: &GenerationTarget) -> Self {
        Self { target: target.describe(), ..Self::default() }
    }

    /// Method jobs with at least one successful attempt.
    pub fn succeeded_methods(&self) -> usize {
        self.classes.iter().map(ClassJobSummary::succeeded_methods).sum()
    }

    /// Attempt records produced across every class.
    pub fn attempts(&self) -> usize {
        self.classes
            .iter()
            .flat_map(|c| &c.methods)
            .map(|m| m.records.len())
            .sum()
    }
}

/// Top-level entry point of a generation run.
pub struct ProjectDispatcher {
    ctx: GenerationContext,
    classes: ClassScheduler,
}

impl ProjectDispatcher {
    /// Dispatcher running every job through `ctx`.
    pub fn new(ctx: GenerationContext) -> Self {
        let classes = ClassScheduler::new(ctx.clone());
        Self { ctx, classes }
    }

    /// Shared context of the run.
    pub fn context(&self) -> &GenerationContext {
        &self.ctx
    }

    /// Run every job `target` expands to.
    ///
    /// # Errors
    ///
    /// Fails without scheduling anything when the project is not compiled,
    /// the parser cannot prepare descriptors, or a short class name is
    /// ambiguous. Missing classes and methods are logged and skipped.
    pub async fn dispatch(&self, target: &GenerationTarget) -> DomainResult<DispatchSummary> {
        let layout = &self.ctx.layout;
        let mut summary = DispatchSummary::new(target);

        if layout.packaging.is_aggregator() {
            let reason = format!("{} is an aggregator project", layout.artifact_id);
            tracing::info!(artifact = %layout.artifact_id, "Skip aggregator project: {}", layout.artifact_id);
            summary.skipped = Some(reason);
            return Ok(summary);
        }
        if !layout.is_compiled() {
            tracing::error!(
                build_dir = %layout.build_dir.display(),
                "project is not compiled"
            );
            return Err(DomainError::ProjectNotCompiled(layout.build_dir.clone()));
        }

        self.ctx.ports.descriptors.prepare().await?;

        tracing::info!(run_id = %self.ctx.run_id, target = %summary.target, "Generation started");

        match target {
            GenerationTarget::Method { class_name, method } => {
                self.dispatch_method(class_name, method, &mut summary).await?;
            }
            GenerationTarget::Class { class_name } => {
                self.dispatch_class(class_name, &mut summary).await?;
            }
            GenerationTarget::Project => self.dispatch_project(&mut summary).await?,
        }

        summary.total_jobs = self.ctx.counters.total();
        summary.completed_jobs = self.ctx.counters.completed();
        summary.cancelled |= self.ctx.is_cancelled()
            || summary.classes.iter().any(|c| c.status == ClassJobStatus::Cancelled);

        tracing::info!(
            run_id = %self.ctx.run_id,
            target = %summary.target,
            completed = summary.completed_jobs,
            total = summary.total_jobs,
            succeeded = summary.succeeded_methods(),
            attempts = summary.attempts(),
            cancelled = summary.cancelled,
            "Generation finished"
        );
        Ok(summary)
    }

    /// Resolve a simple or fully-qualified class name.
    ///
    /// Returns `Ok(None)` when no parsed class matches.
    pub async fn resolve_class_name(&self, name: &str) -> DomainResult<Option<String>> {
        if is_full_name(name) {
            return Ok(Some(name.to_string()));
        }
        let mut candidates = self.ctx.ports.descriptors.classes_named(name).await?;
        match candidates.len() {
            0 => Ok(None),
            1 => Ok(candidates.pop()),
            _ => Err(DomainError::AmbiguousClassName { name: name.to_string(), candidates }),
        }
    }

    async fn load_class(&self, name: &str) -> DomainResult<Option<Arc<ClassDescriptor>>> {
        let Some(full_name) = self.resolve_class_name(name).await? else {
            tracing::warn!(class = %name, "{}", DomainError::ClassNotFound(name.to_string()));
            return Ok(None);
        };
        let class = self.ctx.ports.descriptors.class(&full_name).await?;
        if class.is_none() {
            tracing::warn!(class = %full_name, "{}", DomainError::NoParsedInfo(full_name.clone()));
        }
        Ok(class)
    }

    async fn dispatch_method(
        &self,
        class_name: &str,
        method: &str,
        summary: &mut DispatchSummary,
    ) -> DomainResult<()> {
        let Some(class) = self.load_class(class_name).await? else {
            self.ctx.counters.start(0);
            return Ok(());
        };

        let signatures: Vec<String> = if method.chars().all(|c| c.is_ascii_digit()) {
            class.signature_for_id(method).map(str::to_string).into_iter().collect()
        } else {
            class.signatures_named(method).into_iter().map(str::to_string).collect()
        };
        if signatures.is_empty() {
            let err = DomainError::MethodNotFound {
                class: class.full_name(),
                method: method.to_string(),
            };
            tracing::warn!(class = %class.full_name(), method, "{err}");
            self.ctx.counters.start(0);
            return Ok(());
        }

        let mut methods: Vec<Arc<MethodDescriptor>> = Vec::with_capacity(signatures.len());
        for signature in &signatures {
            match self.ctx.ports.descriptors.method(&class, signature).await? {
                Some(descriptor) => methods.push(descriptor),
                None => tracing::warn!(
                    class = %class.full_name(),
                    method = %signature,
                    "No parsed info found for method: {signature} in class: {}",
                    class.full_name()
                ),
            }
        }

        self.ctx.counters.start(methods.len());
        summary.classes.push(self.classes.run_methods(class, methods).await);
        Ok(())
    }

    async fn dispatch_class(&self, class_name: &str, summary: &mut DispatchSummary) -> DomainResult<()> {
        let Some(class) = self.load_class(class_name).await? else {
            self.ctx.counters.start(0);
            return Ok(());
        };

        let selection = select_methods(
            self.ctx.ports.descriptors.as_ref(),
            self.ctx.ports.filter.as_ref(),
            &class,
        )
        .await?;
        self.ctx.counters.start(selection.eligible.len());

        summary.classes.push(self.classes.run_with(class).await);
        Ok(())
    }

    async fn dispatch_project(&self, summary: &mut DispatchSummary) -> DomainResult<()> {
        let class_names = scan_source_classes(&self.ctx.layout.source_roots);
        let total = count_eligible_methods(
            self.ctx.ports.descriptors.as_ref(),
            self.ctx.ports.filter.as_ref(),
            &class_names,
        )
        .await?;
        self.ctx.counters.start(total);

        let pool = self.ctx.config.class_pool_size();
        tracing::info!(
            classes = class_names.len(),
            total,
            pool,
            max_concurrent_attempts = self.ctx.config.max_concurrent_attempts(),
            "Total method jobs: {total}"
        );

        let semaphore = Arc::new(Semaphore::new(pool));
        let mut handles = Vec::with_capacity(class_names.len());

        for full_name in class_names {
            let permit = tokio::select! {
                biased;
                () = self.ctx.cancel.cancelled() => {
                    summary.cancelled = true;
                    break;
                }
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let ctx = self.ctx.clone();
            let scheduler = self.classes.clone();
            let name = full_name.clone();
            let handle = tokio::spawn(async move {
                let result = run_project_class(&ctx, &scheduler, &name).await;
                drop(permit);
                result
            });
            handles.push((full_name, handle));
        }

        for (full_name, handle) in handles {
            match handle.await {
                Ok(Some(class_summary)) => summary.classes.push(class_summary),
                Ok(None) => {}
                Err(join_err) => {
                    tracing::error!(class = %full_name, error = %join_err, "class job panicked");
                    summary
                        .classes
                        .push(ClassJobSummary::empty(&full_name, ClassJobStatus::Failed(join_err.to_string())));
                }
            }
        }
        Ok(())
    }
}

/// One class job of a whole-project run. `None` when the class is skipped;
/// a class whose info cannot be loaded reports `Failed`.
async fn run_project_class(
    ctx: &GenerationContext,
    scheduler: &ClassScheduler,
    full_name: &str,
) -> Option<ClassJobSummary> {
    let class = match ctx.ports.descriptors.class(full_name).await {
        Ok(Some(class)) => class,
        Ok(None) => {
            tracing::warn!(class = %full_name, "No parsed info found for class: {full_name}");
            return None;
        }
        Err(err) => {
            tracing::error!(class = %full_name, error = %err, "failed to load class descriptor");
            return Some(ClassJobSummary::empty(full_name, ClassJobStatus::Failed(err.to_string())));
        }
    };
    if !ctx.ports.filter.is_class_eligible(&class) {
        tracing::info!("Skip class: {full_name}");
        return None;
    }
    Some(scheduler.run_with(class).await)
}

/// Fully-qualified names of every Java source under `roots`, sorted.
pub fn scan_source_classes(roots: &[PathBuf]) -> Vec<String> {
    let mut names = Vec::new();
    for root in roots {
        if !root.is_dir() {
            tracing::debug!(root = %root.display(), "source root does not exist");
            continue;
        }
        for entry in WalkDir::new(root).follow_links(true).into_iter().filter_map(Result::ok) {
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "java") {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            if SKIPPED_SOURCE_FILES.contains(&file_name.as_ref()) {
                continue;
            }
            if let Some(name) = class_name_from_path(root, path) {
                names.push(name);
            }
        }
    }
    names.sort();
    names.dedup();
    names
}

fn class_name_from_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("."))
}
