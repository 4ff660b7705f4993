// ABOUTME: Error types for workflow engine operations
// ABOUTME: Defines the validation, data-flow, execution, and persistence error taxonomy

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Step '{step}' depends on unknown step '{dependency}'")]
    DependencyError { step: String, dependency: String },

    #[error("Circular dependency detected involving step '{step}'")]
    CircularDependency { step: String },

    #[error("Duplicate step name: {name}")]
    DuplicateStep { name: String },

    #[error("Workflow name cannot be empty")]
    MissingName,

    #[error("Empty workflow: no steps defined")]
    EmptyWorkflow,

    #[error("Step '{step}' requires input '{input}' which no completed step has produced")]
    DataFlowError { step: String, input: String },

    #[error("Step '{step}' failed: {message}")]
    StepExecutionError { step: String, message: String },

    #[error("Step '{step}' timed out after {timeout:?}")]
    StepTimeout { step: String, timeout: Duration },

    #[error("Workflow not found: {id}")]
    WorkflowNotFound { id: String },

    #[error("Workflow '{id}' is {status} and cannot be run")]
    NotRunnable { id: String, status: String },

    #[error("Persistence error: {0}")]
    PersistenceError(#[from] crate::store::StoreError),

    #[error("Failed to read workflow definition: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse workflow definition: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
