//! Common test utilities for integration tests
//!
//! Builds a throwaway Java project on disk (compiled classes directory,
//! sources, parse output) and wires the real file adapters around a
//! scripted generator and validator.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use unitsmith::domain::models::{
    CompileOutcome, PromptMessages, ProjectConfig, ProjectLayout, TestExecution, TestIdentity,
};
use unitsmith::domain::ports::{Generator, NullObfuscator, Validator};
use unitsmith::domain::DomainResult;
use unitsmith::infrastructure::filter::DefaultEligibilityFilter;
use unitsmith::infrastructure::merger::JunitSuiteMerger;
use unitsmith::infrastructure::parser::JsonDescriptorStore;
use unitsmith::infrastructure::prompt::TemplatePromptConstructor;
use unitsmith::infrastructure::records::FileRecordStore;
use unitsmith::{
    AttemptRecord, ClassDescriptor, Collaborators, GenerationContext, MethodDescriptor, RunConfig,
};

/// Candidate returned by the scripted generator. Rule-based repair fixes
/// its package and class name.
pub const CANDIDATE: &str =
    "import org.junit.jupiter.api.Test;\n\npublic class Whatever {\n    @Test\n    void works() {}\n}\n";

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A Java project laid out in a temporary directory.
pub struct TestProject {
    pub dir: TempDir,
    pub config: ProjectConfig,
    class_map: BTreeMap<String, Vec<String>>,
}

impl TestProject {
    /// Empty, compiled project.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = ProjectConfig {
            root: dir.path().to_path_buf(),
            artifact_id: "demo".to_string(),
            ..ProjectConfig::default()
        };
        let project = Self { dir, config, class_map: BTreeMap::new() };
        fs::create_dir_all(project.layout().build_dir).unwrap();
        fs::create_dir_all(project.layout().parse_output).unwrap();
        project
    }

    /// Project whose build directory does not exist.
    pub fn uncompiled() -> Self {
        let project = Self::new();
        fs::remove_dir_all(project.layout().build_dir).unwrap();
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::from_config(&self.config)
    }

    /// Write the source file, parsed class and parsed methods of `class`.
    pub fn add_class(&mut self, class: &ClassDescriptor, methods: &[MethodDescriptor]) {
        let layout = self.layout();
        let source_dir = layout.source_roots[0].join(class.package_path());
        fs::create_dir_all(&source_dir).unwrap();
        fs::write(
            source_dir.join(format!("{}.java", class.class_name)),
            format!("package {};\npublic class {} {{}}\n", class.package_name, class.class_name),
        )
        .unwrap();

        let class_dir = layout.parse_output.join(class.package_path()).join(&class.class_name);
        fs::create_dir_all(&class_dir).unwrap();
        fs::write(class_dir.join("class.json"), serde_json::to_vec_pretty(class).unwrap()).unwrap();
        for method in methods {
            fs::write(
                class_dir.join(format!("{}.json", method.method_id)),
                serde_json::to_vec_pretty(method).unwrap(),
            )
            .unwrap();
        }

        self.class_map
            .entry(class.class_name.clone())
            .or_default()
            .push(class.full_name());
        fs::write(
            layout.parse_output.join("class_map.json"),
            serde_json::to_vec(&self.class_map).unwrap(),
        )
        .unwrap();
    }

    /// Every attempt record written under the records directory, sorted by
    /// class, method id and attempt.
    pub fn records(&self) -> Vec<AttemptRecord> {
        let mut records: Vec<AttemptRecord> = walkdir::WalkDir::new(self.layout().records_dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .map(|e| serde_json::from_slice(&fs::read(e.path()).unwrap()).unwrap())
            .collect();
        records.sort_by(|a, b| {
            (&a.class_name, &a.method_id, a.attempt).cmp(&(&b.class_name, &b.method_id, b.attempt))
        });
        records
    }

    /// Overwrite a parse output file of `class` with malformed JSON.
    pub fn corrupt(&self, class: &ClassDescriptor, file_name: &str) {
        let path = self
            .layout()
            .parse_output
            .join(class.package_path())
            .join(&class.class_name)
            .join(file_name);
        fs::write(path, "{ not json").unwrap();
    }

    pub fn test_file(&self, package: &str, test_class: &str) -> PathBuf {
        self.layout()
            .test_output
            .join(package.replace('.', "/"))
            .join(format!("{test_class}.java"))
    }
}

/// `Foo` with two eligible methods and one getter.
pub fn foo() -> (ClassDescriptor, Vec<MethodDescriptor>) {
    let class = ClassDescriptor::new("com.acme", "Foo")
        .with_method("add(int, int)", "0")
        .with_method("sub(int, int)", "1")
        .with_method("getX()", "2");
    let methods = vec![
        MethodDescriptor {
            source: "public int add(int a, int b) { return a + b; }".into(),
            ..MethodDescriptor::new("add(int, int)", "0")
        },
        MethodDescriptor {
            source: "public int sub(int a, int b) { return a - b; }".into(),
            ..MethodDescriptor::new("sub(int, int)", "1")
        },
        MethodDescriptor { is_get_set: true, ..MethodDescriptor::new("getX()", "2") },
    ];
    (class, methods)
}

/// Generator that always answers with [`CANDIDATE`].
#[derive(Default)]
pub struct FixedGenerator {
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl FixedGenerator {
    pub fn with_delay(delay: Duration) -> Self {
        Self { calls: AtomicUsize::new(0), delay: Some(delay) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for FixedGenerator {
    async fn generate(&self, _messages: &PromptMessages) -> DomainResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(CANDIDATE.to_string())
    }
}

type PassRule = Box<dyn Fn(&TestIdentity) -> bool + Send + Sync>;

/// Validator deciding pass/fail per test class.
pub struct RuleValidator {
    passes: PassRule,
    panic_on: Option<String>,
    compiles: AtomicUsize,
    compiled: Mutex<Vec<String>>,
}

impl RuleValidator {
    pub fn new(passes: impl Fn(&TestIdentity) -> bool + Send + Sync + 'static) -> Self {
        Self {
            passes: Box::new(passes),
            panic_on: None,
            compiles: AtomicUsize::new(0),
            compiled: Mutex::new(Vec::new()),
        }
    }

    /// Passes every test class except those ending with `suffix`, on which
    /// the validator panics.
    pub fn panicking_on(suffix: &str) -> Self {
        Self { panic_on: Some(suffix.to_string()), ..Self::new(|_| true) }
    }

    pub fn always_failing() -> Self {
        Self::new(|_| false)
    }

    pub fn compiles(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }

    /// Test classes compiled so far, in call order.
    pub fn compiled(&self) -> Vec<String> {
        self.compiled.lock().unwrap().clone()
    }
}

#[async_trait]
impl Validator for RuleValidator {
    async fn compile(&self, candidate: &str, test: &TestIdentity) -> DomainResult<CompileOutcome> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        self.compiled.lock().unwrap().push(test.test_class.clone());
        assert!(
            candidate.contains(&format!("class {}", test.test_class)),
            "candidate was not renamed to {}",
            test.test_class
        );
        if let Some(suffix) = &self.panic_on {
            if test.test_class.ends_with(suffix.as_str()) {
                panic!("validator crashed on {}", test.test_class);
            }
        }
        if (self.passes)(test) {
            Ok(CompileOutcome::ok())
        } else {
            Ok(CompileOutcome::failed(vec![format!(
                "{}.java:5: error: cannot find symbol",
                test.test_class
            )]))
        }
    }

    async fn execute(&self, _test: &TestIdentity) -> DomainResult<TestExecution> {
        Ok(TestExecution::passed(1))
    }
}

/// Wire the real file adapters of `project` around the scripted
/// generator and validator.
pub fn context(
    project: &TestProject,
    run: RunConfig,
    generator: Arc<FixedGenerator>,
    validator: Arc<RuleValidator>,
) -> GenerationContext {
    let layout = project.layout();
    let ports = Collaborators {
        descriptors: Arc::new(JsonDescriptorStore::new(&layout.parse_output, &layout.root, Vec::new())),
        prompts: Arc::new(TemplatePromptConstructor::new()),
        generator,
        validator,
        merger: Arc::new(JunitSuiteMerger::new(&layout.test_output)),
        filter: Arc::new(DefaultEligibilityFilter::new()),
        records: Arc::new(FileRecordStore::new(&layout.records_dir)),
        obfuscator: Arc::new(NullObfuscator::new()),
    };
    GenerationContext::new(run, layout, ports)
}

/// Sequential run settings with the given attempt and round limits.
pub fn sequential(attempts_per_method: u32, max_rounds: u32, stop_when_success: bool) -> RunConfig {
    RunConfig {
        enable_multithreading: false,
        attempts_per_method,
        max_rounds,
        stop_when_success,
        ..RunConfig::default()
    }
}
