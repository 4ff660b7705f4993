// ABOUTME: Executor contract consumed by the workflow engine
// ABOUTME: Defines the abstract execute operation and the name-to-implementation binding set

pub mod scripted;

pub use scripted::ScriptedExecutor;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Input bag handed to an executor. Params are opaque to the engine and
/// passed through untouched, merged with any resolved data inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorInput {
    pub task_id: String,
    pub step_name: String,
    pub params: Map<String, Value>,
}

/// The single abstract result shape the engine depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorReply {
    pub success: bool,
    pub payload: Option<Value>,
    pub error: Option<String>,
}

impl ExecutorReply {
    pub fn ok(payload: Value) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: None,
            error: Some(error.into()),
        }
    }
}

/// A named capability work can be dispatched to. Everything beyond this
/// contract (the executor's internal logic) is outside the engine's concern.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, input: ExecutorInput) -> ExecutorReply;

    fn name(&self) -> &str;
}

/// Binds registry executor names to concrete implementations.
#[derive(Clone, Default)]
pub struct ExecutorSet {
    bindings: HashMap<String, Arc<dyn Executor>>,
}

impl ExecutorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, executor: Arc<dyn Executor>) {
        self.bindings.insert(executor.name().to_string(), executor);
    }

    pub fn with(mut self, executor: Arc<dyn Executor>) -> Self {
        self.bind(executor);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Executor>> {
        self.bindings.get(name).map(Arc::clone)
    }

    pub fn names(&self) -> Vec<&str> {
        self.bindings.keys().map(|k| k.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Wraps a plain closure as an executor. Mostly useful for embedding and
/// tests, where a full executor implementation would be noise.
pub struct FnExecutor<F> {
    name: String,
    func: F,
}

impl<F> FnExecutor<F>
where
    F: Fn(ExecutorInput) -> ExecutorReply + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

#[async_trait]
impl<F> Executor for FnExecutor<F>
where
    F: Fn(ExecutorInput) -> ExecutorReply + Send + Sync,
{
    async fn execute(&self, input: ExecutorInput) -> ExecutorReply {
        (self.func)(input)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
