// ABOUTME: File-backed run store persisting the workflow log as one JSON document
// ABOUTME: Serializes writers and rewrites the whole log on every save

use async_trait::async_trait;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::error::Result;
use super::RunStore;
use crate::engine::WorkflowInstance;

/// Persists all workflow instances in a single JSON file keyed by id.
///
/// Saves are overwrite-on-write: the full log is rewritten each time, under
/// a writer mutex so concurrent saves cannot interleave. Instances are only
/// ever added or replaced, never removed — the log is the audit trail.
pub struct FileRunStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileRunStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_log(&self) -> Result<IndexMap<String, WorkflowInstance>> {
        if !self.path.exists() {
            return Ok(IndexMap::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(IndexMap::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    async fn write_log(&self, log: &IndexMap<String, WorkflowInstance>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(log)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl RunStore for FileRunStore {
    async fn save(&self, workflow: &WorkflowInstance) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut log = self.read_log().await?;
        log.insert(workflow.id.clone(), workflow.clone());
        self.write_log(&log).await?;

        debug!(
            "Persisted workflow {} ({} results, status {})",
            workflow.id,
            workflow.results.len(),
            workflow.status
        );
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<WorkflowInstance>> {
        let log = self.read_log().await?;
        Ok(log.get(id).cloned())
    }

    async fn load_all(&self) -> Result<Vec<WorkflowInstance>> {
        let log = self.read_log().await?;
        Ok(log.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{StepDefinition, StepOutcome, WorkflowSpec};
    use tempfile::TempDir;

    fn instance(name: &str) -> WorkflowInstance {
        WorkflowInstance::new(WorkflowSpec::new(
            name,
            vec![StepDefinition::new("only", "structure")],
        ))
    }

    #[tokio::test]
    async fn test_load_from_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRunStore::new(temp_dir.path().join("runs.json"));

        assert!(store.load_all().await.unwrap().is_empty());
        assert!(store.load("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRunStore::new(temp_dir.path().join("runs.json"));

        let wf = instance("persisted");
        store.save(&wf).await.unwrap();

        let loaded = store.load(&wf.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "persisted");
        assert_eq!(loaded.steps.len(), 1);
    }

    #[tokio::test]
    async fn test_save_overwrites_by_id() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRunStore::new(temp_dir.path().join("runs.json"));

        let mut wf = instance("evolving");
        store.save(&wf).await.unwrap();

        wf.mark_running();
        wf.record(StepOutcome::success(0, "only", None));
        store.save(&wf).await.unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].results.len(), 1);
    }

    #[tokio::test]
    async fn test_multiple_workflows_coexist() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRunStore::new(temp_dir.path().join("nested/dir/runs.json"));

        store.save(&instance("one")).await.unwrap();
        store.save(&instance("two")).await.unwrap();

        assert_eq!(store.load_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_log_readable_by_external_scanner() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("runs.json");
        let store = FileRunStore::new(&path);

        let wf = instance("audited");
        store.save(&wf).await.unwrap();

        // A reader independent of the store sees the same record.
        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[wf.id.as_str()]["name"], "audited");
    }
}
