// ABOUTME: In-memory run store for embedding and tests
// ABOUTME: Keeps workflow instances in a shared map with the same contract as the file store

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use super::error::Result;
use super::RunStore;
use crate::engine::WorkflowInstance;

/// Non-durable store with the same observable semantics as the file store.
#[derive(Default)]
pub struct MemoryRunStore {
    log: RwLock<IndexMap<String, WorkflowInstance>>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn save(&self, workflow: &WorkflowInstance) -> Result<()> {
        let mut log = self.log.write().await;
        log.insert(workflow.id.clone(), workflow.clone());
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<WorkflowInstance>> {
        let log = self.log.read().await;
        Ok(log.get(id).cloned())
    }

    async fn load_all(&self) -> Result<Vec<WorkflowInstance>> {
        let log = self.log.read().await;
        Ok(log.values().cloned().collect())
    }
}
