// ABOUTME: Durable run-log storage for workflow instances
// ABOUTME: Defines the store contract plus file-backed and in-memory implementations

pub mod error;
pub mod file;
pub mod memory;

pub use error::{Result, StoreError};
pub use file::FileRunStore;
pub use memory::MemoryRunStore;

use async_trait::async_trait;

use crate::engine::WorkflowInstance;

/// Durable record of all workflow instances, keyed by id.
///
/// Every state-affecting engine operation saves before returning, so a
/// reader scanning the log always observes a consistent prefix of
/// progress. A failed save must propagate — a workflow whose progress
/// cannot be recorded is not allowed to silently continue.
#[async_trait]
pub trait RunStore: Send + Sync {
    async fn save(&self, workflow: &WorkflowInstance) -> Result<()>;

    async fn load(&self, id: &str) -> Result<Option<WorkflowInstance>>;

    async fn load_all(&self) -> Result<Vec<WorkflowInstance>>;
}
