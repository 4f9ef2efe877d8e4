//! Descriptor source backed by the parser's JSON output.
//!
//! Layout under the parse output directory:
//!
//! ```text
//! class_map.json                      simple name -> [full names]
//! <pkg dirs>/<Class>/class.json       ClassDescriptor
//! <pkg dirs>/<Class>/<method_id>.json MethodDescriptor
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::process::Command;
use tokio::sync::{OnceCell, RwLock};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::descriptor::package_to_path;
use crate::domain::models::{ClassDescriptor, MethodDescriptor};
use crate::domain::ports::DescriptorSource;

pub const CLASS_MAP_FILE: &str = "class_map.json";
pub const CLASS_FILE: &str = "class.json";

type MethodKey = (String, String);

/// Reads parse output from disk, caching every lookup.
pub struct JsonDescriptorStore {
    parse_output: PathBuf,
    project_root: PathBuf,
    /// Program and arguments; `{root}` and `{output}` are substituted
    parser_command: Vec<String>,
    classes: RwLock<HashMap<String, Option<Arc<ClassDescriptor>>>>,
    methods: RwLock<HashMap<MethodKey, Option<Arc<MethodDescriptor>>>>,
    class_map: OnceCell<HashMap<String, Vec<String>>>,
}

impl JsonDescriptorStore {
    pub fn new(
        parse_output: impl Into<PathBuf>,
        project_root: impl Into<PathBuf>,
        parser_command: Vec<String>,
    ) -> Self {
        Self {
            parse_output: parse_output.into(),
            project_root: project_root.into(),
            parser_command,
            classes: RwLock::new(HashMap::new()),
            methods: RwLock::new(HashMap::new()),
            class_map: OnceCell::new(),
        }
    }

    fn is_parsed(&self) -> bool {
        self.parse_output.join(CLASS_MAP_FILE).is_file()
    }

    fn class_dir(&self, full_name: &str) -> PathBuf {
        let (package, class) = full_name.rsplit_once('.').unwrap_or(("", full_name));
        self.parse_output.join(package_to_path(package)).join(class)
    }

    async fn run_parser(&self) -> DomainResult<()> {
        let Some((program, args)) = self.parser_command.split_first() else {
            return Err(DomainError::NoParsedInfo(format!(
                "{} (no parser command configured)",
                self.parse_output.display()
            )));
        };
        let root = self.project_root.display().to_string();
        let output_dir = self.parse_output.display().to_string();
        let args: Vec<String> = args
            .iter()
            .map(|a| a.replace("{root}", &root).replace("{output}", &output_dir))
            .collect();

        tokio::fs::create_dir_all(&self.parse_output).await?;
        tracing::info!(program = %program, output = %output_dir, "Parsing project");

        let output = Command::new(program)
            .args(&args)
            .current_dir(&self.project_root)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DomainError::Io(format!("failed to spawn parser {program}: {e}")))?;
        if !output.status.success() {
            return Err(DomainError::Io(format!(
                "parser exited with code {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    async fn load_class_map(&self) -> DomainResult<&HashMap<String, Vec<String>>> {
        self.class_map
            .get_or_try_init(|| async {
                let map = read_json::<HashMap<String, Vec<String>>>(
                    &self.parse_output.join(CLASS_MAP_FILE),
                )
                .await?;
                Ok::<_, DomainError>(map.unwrap_or_default())
            })
            .await
    }
}

/// Read and deserialize a JSON file, `None` if it does not exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> DomainResult<Option<T>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => serde_json::from_str(&text).map(Some).map_err(|e| {
            DomainError::Serialization(format!("{}: {e}", path.display()))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl DescriptorSource for JsonDescriptorStore {
    async fn prepare(&self) -> DomainResult<()> {
        if self.is_parsed() {
            tracing::info!(output = %self.parse_output.display(), "Parse output already exists, skip parsing");
            return Ok(());
        }
        self.run_parser().await?;
        if !self.is_parsed() {
            return Err(DomainError::NoParsedInfo(format!(
                "{} (parser wrote no {CLASS_MAP_FILE})",
                self.parse_output.display()
            )));
        }
        Ok(())
    }

    async fn class(&self, full_name: &str) -> DomainResult<Option<Arc<ClassDescriptor>>> {
        if let Some(cached) = self.classes.read().await.get(full_name) {
            return Ok(cached.clone());
        }
        let path = self.class_dir(full_name).join(CLASS_FILE);
        let class = read_json::<ClassDescriptor>(&path).await?.map(Arc::new);
        self.classes
            .write()
            .await
            .insert(full_name.to_string(), class.clone());
        Ok(class)
    }

    async fn method(
        &self,
        class: &ClassDescriptor,
        signature: &str,
    ) -> DomainResult<Option<Arc<MethodDescriptor>>> {
        let full_name = class.full_name();
        let key = (full_name.clone(), signature.to_string());
        if let Some(cached) = self.methods.read().await.get(&key) {
            return Ok(cached.clone());
        }
        let Some(method_id) = class.method_sigs.get(signature) else {
            return Ok(None);
        };
        let path = self.class_dir(&full_name).join(format!("{method_id}.json"));
        let method = read_json::<MethodDescriptor>(&path).await?.map(Arc::new);
        self.methods.write().await.insert(key, method.clone());
        Ok(method)
    }

    async fn classes_named(&self, simple_name: &str) -> DomainResult<Vec<String>> {
        let mut names = self
            .load_class_map()
            .await?
            .get(simple_name)
            .cloned()
            .unwrap_or_default();
        names.sort();
        names.dedup();
        Ok(names)
    }
}
