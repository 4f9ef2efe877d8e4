//! Project layout and generation targets.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::config::ProjectConfig;

/// Packaging type of the project under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Packaging {
    Jar,
    War,
    /// Aggregator/parent project that builds no artifact
    Pom,
    Other(String),
}

impl Packaging {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "jar" => Self::Jar,
            "war" => Self::War,
            "pom" => Self::Pom,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_aggregator(&self) -> bool {
        matches!(self, Self::Pom)
    }
}

/// Resolved, absolute paths of the project under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub artifact_id: String,
    pub packaging: Packaging,
    /// Compiled classes directory; must exist before generation
    pub build_dir: PathBuf,
    pub source_roots: Vec<PathBuf>,
    pub parse_output: PathBuf,
    pub test_output: PathBuf,
    pub staging_dir: PathBuf,
    pub records_dir: PathBuf,
}

impl ProjectLayout {
    /// Resolve configured (possibly relative) paths against the project root.
    pub fn from_config(config: &ProjectConfig) -> Self {
        let root = config.root.clone();
        let resolve = |p: &Path| if p.is_absolute() { p.to_path_buf() } else { root.join(p) };
        Self {
            artifact_id: config.artifact_id.clone(),
            packaging: Packaging::from_str(&config.packaging),
            build_dir: resolve(&config.build_dir),
            source_roots: config.source_roots.iter().map(|p| resolve(p)).collect(),
            parse_output: resolve(&config.parse_output),
            test_output: resolve(&config.test_output),
            staging_dir: resolve(&config.staging_dir),
            records_dir: resolve(&config.records_dir),
            root,
        }
    }

    pub fn is_compiled(&self) -> bool {
        self.build_dir.is_dir()
    }
}

/// What the user asked to generate tests for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationTarget {
    /// One method, by name (all overloads) or numeric id
    Method { class_name: String, method: String },
    /// Every eligible method of one class
    Class { class_name: String },
    /// Every eligible method of every class
    Project,
}

impl GenerationTarget {
    pub fn describe(&self) -> String {
        match self {
            Self::Method { class_name, method } => format!("method {method} of {class_name}"),
            Self::Class { class_name } => format!("class {class_name}"),
            Self::Project => "project".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packaging_parse() {
        assert_eq!(Packaging::from_str("JAR"), Packaging::Jar);
        assert!(Packaging::from_str("pom").is_aggregator());
        assert_eq!(Packaging::from_str("bundle"), Packaging::Other("bundle".into()));
    }

    #[test]
    fn layout_resolves_relative_paths() {
        let config = ProjectConfig {
            root: PathBuf::from("/work/app"),
            records_dir: PathBuf::from("/var/records"),
            ..ProjectConfig::default()
        };
        let layout = ProjectLayout::from_config(&config);
        assert_eq!(layout.build_dir, PathBuf::from("/work/app/target/classes"));
        assert_eq!(layout.source_roots, vec![PathBuf::from("/work/app/src/main/java")]);
        assert_eq!(layout.records_dir, PathBuf::from("/var/records"));
        assert!(!layout.is_compiled());
    }

    #[test]
    fn target_description() {
        let target = GenerationTarget::Method { class_name: "Foo".into(), method: "bar".into() };
        assert_eq!(target.describe(), "method bar of Foo");
    }
}
