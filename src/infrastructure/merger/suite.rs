//! JUnit 5 suite merger.
//!
//! Collects the generated test classes of one class from the test output
//! tree and writes a `<Class>Suite.java` selecting all of them.

use std::path::PathBuf;

use async_trait::async_trait;
use regex::Regex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::ClassDescriptor;
use crate::domain::ports::TestClassMerger;
use crate::services::naming;

/// Writes one `@Suite` class per class under test.
pub struct JunitSuiteMerger {
    test_output: PathBuf,
}

impl JunitSuiteMerger {
    pub fn new(test_output: impl Into<PathBuf>) -> Self {
        Self { test_output: test_output.into() }
    }

    /// Generated test class names of `class`, sorted.
    async fn test_classes(&self, class: &ClassDescriptor) -> DomainResult<Vec<String>> {
        let dir = self.test_output.join(class.package_path());
        let pattern = Regex::new(&format!(
            r"^{}[^_]+_\d+Test\.java$",
            regex::escape(&naming::test_class_prefix(class))
        ))
        .map_err(|e| DomainError::Merge(e.to_string()))?;

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if pattern.is_match(&file_name) {
                if let Some(stem) = file_name.strip_suffix(".java") {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn render(class: &ClassDescriptor, suite: &str, tests: &[String]) -> String {
        let mut source = String::new();
        if !class.package_name.is_empty() {
            source.push_str(&format!("package {};\n\n", class.package_name));
        }
        source.push_str("import org.junit.platform.suite.api.SelectClasses;\n");
        source.push_str("import org.junit.platform.suite.api.Suite;\n\n");
        source.push_str("@Suite\n@SelectClasses({\n");
        let selected: Vec<String> = tests.iter().map(|t| format!("    {t}.class")).collect();
        source.push_str(&selected.join(",\n"));
        source.push_str(&format!("\n}})\npublic class {suite} {{\n}}\n"));
        source
    }
}

#[async_trait]
impl TestClassMerger for JunitSuiteMerger {
    async fn merge(&self, class: &ClassDescriptor) -> DomainResult<bool> {
        let tests = self.test_classes(class).await?;
        if tests.is_empty() {
            return Ok(false);
        }

        let suite = naming::suite_class_name(class);
        let path = self
            .test_output
            .join(class.package_path())
            .join(format!("{suite}.java"));
        tokio::fs::write(&path, Self::render(class, &suite, &tests))
            .await
            .map_err(|e| DomainError::Merge(format!("{}: {e}", path.display())))?;

        tracing::debug!(suite = %path.display(), tests = tests.len(), "wrote suite");
        Ok(true)
    }
}
