//! File-system record store.
//!
//! Records land under `<records_dir>/<pkg dirs>/<Class>/<method_id>/attempt_<n>.json`.
//! Successful candidates are also written to their test file.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::descriptor::package_to_path;
use crate::domain::models::AttemptRecord;
use crate::domain::ports::RecordStore;

/// Persists attempt records as pretty-printed JSON files.
pub struct FileRecordStore {
    records_dir: PathBuf,
}

impl FileRecordStore {
    pub fn new(records_dir: impl Into<PathBuf>) -> Self {
        Self { records_dir: records_dir.into() }
    }

    /// Where the record of `record` is written.
    pub fn record_path(&self, record: &AttemptRecord) -> PathBuf {
        let (package, class) = record
            .class_name
            .rsplit_once('.')
            .unwrap_or(("", record.class_name.as_str()));
        self.records_dir
            .join(package_to_path(package))
            .join(class)
            .join(&record.method_id)
            .join(format!("attempt_{}.json", record.attempt))
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn persist(&self, record: &AttemptRecord) -> DomainResult<()> {
        let path = self.record_path(record);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, serde_json::to_vec_pretty(record)?).await?;

        if record.success {
            if let Some(parent) = record.test_file.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&record.test_file, &record.candidate).await?;
            tracing::info!(test = %record.test_file.display(), "wrote generated test");
        }
        Ok(())
    }
}
