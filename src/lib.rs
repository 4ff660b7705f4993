// ABOUTME: Main library module for the switchyard orchestration engine
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod engine;
pub mod executors;
pub mod registry;
pub mod reporting;
pub mod router;
pub mod store;

// Re-export commonly used types
pub use engine::{
    StatusReport, StepDefinition, StepOutcome, WorkflowEngine, WorkflowInstance, WorkflowSpec,
    WorkflowStatus,
};
pub use executors::{Executor, ExecutorReply, ExecutorSet};
pub use registry::{AgentRegistry, Catalog, ComplianceStatus, ExecutorRecord};
pub use router::{RouteTable, RoutingDecision, TaskRouter, WorkItem};
pub use store::{FileRunStore, MemoryRunStore, RunStore};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
