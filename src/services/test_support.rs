//! In-memory collaborators for scheduler unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AttemptRecord, ChatMessage, ClassDescriptor, CompileOutcome, MethodDescriptor, ProjectConfig,
    ProjectLayout, PromptMessages, RunConfig, TestExecution, TestIdentity, ValidationFailure,
};
use crate::domain::ports::{
    DescriptorSource, Generator, NullObfuscator, PromptConstructor, RecordStore, TestClassMerger,
    Validator,
};
use crate::infrastructure::filter::DefaultEligibilityFilter;
use crate::services::context::{Collaborators, GenerationContext};

pub const CANDIDATE: &str =
    "public class CalculatorTest {\n  @Test void adds() { assertEquals(2, 1 + 1); }\n}\n";

/// What the validator reports for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    CompileError,
    TestFailure,
    Error,
    /// The validator panics
    Panic,
}

// ---------------------------------------------------------------------------
// Descriptors

#[derive(Default)]
pub struct MemoryDescriptors {
    classes: Mutex<HashMap<String, Arc<ClassDescriptor>>>,
    methods: Mutex<HashMap<(String, String), Arc<MethodDescriptor>>>,
    corrupt: Mutex<HashSet<(String, Option<String>)>>,
    prepared: AtomicUsize,
}

impl MemoryDescriptors {
    pub fn add_class(&self, class: ClassDescriptor) {
        self.classes
            .lock()
            .unwrap()
            .insert(class.full_name(), Arc::new(class));
    }

    pub fn add_method(&self, class: &ClassDescriptor, method: MethodDescriptor) {
        self.methods
            .lock()
            .unwrap()
            .insert((class.full_name(), method.signature.clone()), Arc::new(method));
    }

    /// Loading `full_name` fails as if its class info were malformed.
    pub fn corrupt_class(&self, full_name: &str) {
        self.corrupt.lock().unwrap().insert((full_name.to_string(), None));
    }

    /// Loading `signature` of `class` fails as if its method info were malformed.
    pub fn corrupt_method(&self, class: &ClassDescriptor, signature: &str) {
        self.corrupt
            .lock()
            .unwrap()
            .insert((class.full_name(), Some(signature.to_string())));
    }

    pub fn prepared(&self) -> usize {
        self.prepared.load(Ordering::SeqCst)
    }

    fn check(&self, full_name: String, signature: Option<String>) -> DomainResult<()> {
        let key = (full_name, signature);
        if self.corrupt.lock().unwrap().contains(&key) {
            return Err(DomainError::Serialization(format!(
                "{}: key must be a string at line 1 column 3",
                key.0
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DescriptorSource for MemoryDescriptors {
    async fn prepare(&self) -> DomainResult<()> {
        self.prepared.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn class(&self, full_name: &str) -> DomainResult<Option<Arc<ClassDescriptor>>> {
        self.check(full_name.to_string(), None)?;
        Ok(self.classes.lock().unwrap().get(full_name).cloned())
    }

    async fn method(
        &self,
        class: &ClassDescriptor,
        signature: &str,
    ) -> DomainResult<Option<Arc<MethodDescriptor>>> {
        self.check(class.full_name(), Some(signature.to_string()))?;
        Ok(self
            .methods
            .lock()
            .unwrap()
            .get(&(class.full_name(), signature.to_string()))
            .cloned())
    }

    async fn classes_named(&self, simple_name: &str) -> DomainResult<Vec<String>> {
        let mut names: Vec<String> = self
            .classes
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.class_name == simple_name)
            .map(|c| c.full_name())
            .collect();
        names.sort();
        Ok(names)
    }
}

// ---------------------------------------------------------------------------
// Prompts

#[derive(Default)]
pub struct RecordingPrompts {
    feedback: Mutex<Vec<String>>,
}

impl RecordingPrompts {
    pub fn feedback_calls(&self) -> usize {
        self.feedback.lock().unwrap().len()
    }

    pub fn last_feedback(&self) -> Option<String> {
        self.feedback.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PromptConstructor for RecordingPrompts {
    async fn build_initial(
        &self,
        class: &ClassDescriptor,
        method: &MethodDescriptor,
        test: &TestIdentity,
    ) -> DomainResult<PromptMessages> {
        Ok(PromptMessages::new(vec![
            ChatMessage::system("You write JUnit 5 tests."),
            ChatMessage::user(format!(
                "Write {} for {}#{}",
                test.test_class,
                class.full_name(),
                method.signature
            )),
        ]))
    }

    async fn build_with_feedback(
        &self,
        prior: &PromptMessages,
        candidate: &str,
        failure: &ValidationFailure,
    ) -> DomainResult<PromptMessages> {
        let feedback = failure.feedback();
        self.feedback.lock().unwrap().push(feedback.clone());
        let mut messages = prior.clone();
        messages.push(ChatMessage::assistant(candidate));
        messages.push(ChatMessage::user(feedback));
        Ok(messages)
    }
}

// ---------------------------------------------------------------------------
// Generator

#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

impl ScriptedGenerator {
    /// Queue responses; once drained every call returns [`CANDIDATE`].
    pub fn respond_with(&self, responses: Vec<String>) {
        *self.responses.lock().unwrap() = responses.into();
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, _messages: &PromptMessages) -> DomainResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| CANDIDATE.to_string());

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// Validator

type VerdictFn = Box<dyn Fn(&TestIdentity) -> Verdict + Send + Sync>;

pub struct ScriptedValidator {
    script: Mutex<VecDeque<Verdict>>,
    by_test: Option<VerdictFn>,
    pending: Mutex<HashMap<String, Verdict>>,
    compiles: AtomicUsize,
    executions: AtomicUsize,
    last_candidate: Mutex<Option<String>>,
}

impl ScriptedValidator {
    /// Consume `script` one verdict per compile; compile errors afterwards.
    pub fn new(script: Vec<Verdict>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            by_test: None,
            pending: Mutex::new(HashMap::new()),
            compiles: AtomicUsize::new(0),
            executions: AtomicUsize::new(0),
            last_candidate: Mutex::new(None),
        }
    }

    /// Decide the verdict from the test identity instead of a script.
    pub fn by_test(verdict: impl Fn(&TestIdentity) -> Verdict + Send + Sync + 'static) -> Self {
        Self { by_test: Some(Box::new(verdict)), ..Self::new(Vec::new()) }
    }

    pub fn compiles(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    pub fn last_candidate(&self) -> Option<String> {
        self.last_candidate.lock().unwrap().clone()
    }
}

#[async_trait]
impl Validator for ScriptedValidator {
    async fn compile(&self, candidate: &str, test: &TestIdentity) -> DomainResult<CompileOutcome> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        *self.last_candidate.lock().unwrap() = Some(candidate.to_string());

        let verdict = match &self.by_test {
            Some(decide) => decide(test),
            None => self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Verdict::CompileError),
        };
        match verdict {
            Verdict::Error => Err(DomainError::Validation("javac not found".into())),
            Verdict::Panic => panic!("validator crashed on {}", test.test_class),
            Verdict::CompileError => Ok(CompileOutcome::failed(vec![
                "error: cannot find symbol".to_string(),
            ])),
            verdict => {
                self.pending.lock().unwrap().insert(test.full_name(), verdict);
                Ok(CompileOutcome::ok())
            }
        }
    }

    async fn execute(&self, test: &TestIdentity) -> DomainResult<TestExecution> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        match self.pending.lock().unwrap().remove(&test.full_name()) {
            Some(Verdict::Pass) => Ok(TestExecution::passed(1)),
            _ => Ok(TestExecution::failed(
                1,
                vec!["adds() expected: <2> but was: <3>".to_string()],
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Merger and records

#[derive(Default)]
pub struct CountingMerger {
    merged: Mutex<Vec<String>>,
    fail: bool,
    panic: bool,
}

impl CountingMerger {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn panicking() -> Self {
        Self { panic: true, ..Self::default() }
    }

    pub fn merged(&self) -> Vec<String> {
        self.merged.lock().unwrap().clone()
    }
}

#[async_trait]
impl TestClassMerger for CountingMerger {
    async fn merge(&self, class: &ClassDescriptor) -> DomainResult<bool> {
        self.merged.lock().unwrap().push(class.full_name());
        if self.panic {
            panic!("merger crashed on {}", class.full_name());
        }
        if self.fail {
            return Err(DomainError::Merge("suite template missing".into()));
        }
        Ok(true)
    }
}

#[derive(Default)]
pub struct MemoryRecords {
    records: Mutex<Vec<AttemptRecord>>,
    panic_on: Option<String>,
}

impl MemoryRecords {
    /// Panic when persisting any record whose test name ends with `suffix`.
    pub fn panicking_on(suffix: &str) -> Self {
        Self { panic_on: Some(suffix.to_string()), ..Self::default() }
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn records(&self) -> Vec<AttemptRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecords {
    async fn persist(&self, record: &AttemptRecord) -> DomainResult<()> {
        if self.panic_on.as_deref().is_some_and(|suffix| record.test_name.ends_with(suffix)) {
            panic!("record store crashed on {}", record.test_name);
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixture

pub struct Fixture {
    pub ctx: GenerationContext,
    pub class: Arc<ClassDescriptor>,
    pub method: Arc<MethodDescriptor>,
    pub descriptors: Arc<MemoryDescriptors>,
    pub prompts: Arc<RecordingPrompts>,
    pub generator: Arc<ScriptedGenerator>,
    pub validator: Arc<ScriptedValidator>,
    pub merger: Arc<CountingMerger>,
    pub records: Arc<MemoryRecords>,
}

impl Fixture {
    pub fn set_max_prompt_tokens(&mut self, max: usize) {
        self.update_config(|config| config.max_prompt_tokens = max);
    }

    pub fn update_config(&mut self, update: impl FnOnce(&mut RunConfig)) {
        let mut config = (*self.ctx.config).clone();
        update(&mut config);
        self.ctx.config = Arc::new(config);
    }
}

/// `com.example.Calculator` with `add` (id 0), `getValue` (id 1, accessor)
/// and `sub` (id 2). `fixture.method` is `add`.
pub fn calculator() -> (ClassDescriptor, Vec<MethodDescriptor>) {
    let class = ClassDescriptor {
        imports: vec!["import java.util.List;".to_string()],
        ..ClassDescriptor::new("com.example", "Calculator")
            .with_method("add(int, int)", "0")
            .with_method("getValue()", "1")
            .with_method("sub(int, int)", "2")
    };
    let methods = vec![
        MethodDescriptor::new("add(int, int)", "0"),
        MethodDescriptor { is_get_set: true, ..MethodDescriptor::new("getValue()", "1") },
        MethodDescriptor::new("sub(int, int)", "2"),
    ];
    (class, methods)
}

pub fn fixture(max_rounds: u32, attempts_per_method: u32, script: Vec<Verdict>) -> Fixture {
    fixture_with(max_rounds, attempts_per_method, ScriptedValidator::new(script))
}

pub fn fixture_with(max_rounds: u32, attempts_per_method: u32, validator: ScriptedValidator) -> Fixture {
    let descriptors = Arc::new(MemoryDescriptors::default());
    let (class, methods) = calculator();
    for method in methods {
        descriptors.add_method(&class, method);
    }
    descriptors.add_class(class.clone());

    let prompts = Arc::new(RecordingPrompts::default());
    let generator = Arc::new(ScriptedGenerator::default());
    let validator = Arc::new(validator);
    let merger = Arc::new(CountingMerger::default());
    let records = Arc::new(MemoryRecords::default());

    let ports = Collaborators {
        descriptors: descriptors.clone(),
        prompts: prompts.clone(),
        generator: generator.clone(),
        validator: validator.clone(),
        merger: merger.clone(),
        filter: Arc::new(DefaultEligibilityFilter::new()),
        records: records.clone(),
        obfuscator: Arc::new(NullObfuscator::new()),
    };
    let config = RunConfig { max_rounds, attempts_per_method, ..RunConfig::default() };
    let layout = ProjectLayout::from_config(&ProjectConfig {
        root: PathBuf::from("/work/calculator"),
        ..ProjectConfig::default()
    });

    Fixture {
        ctx: GenerationContext::new(config, layout, ports),
        method: Arc::new(MethodDescriptor::new("add(int, int)", "0")),
        class: Arc::new(class),
        descriptors,
        prompts,
        generator,
        validator,
        merger,
        records,
    }
}
