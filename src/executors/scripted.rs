// ABOUTME: Scripted executor used by the CLI shell and demo workflows
// ABOUTME: Echoes its input bag back as the payload so workflows run end-to-end

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use super::{Executor, ExecutorInput, ExecutorReply};

/// Stand-in executor that acknowledges the work item and echoes its params.
///
/// The real content-generation agents live outside this crate; binding one
/// of these per catalog record lets a workflow file execute end-to-end
/// without them. A `fail` boolean in the params forces a failure reply,
/// which is enough to exercise partial-failure paths from the CLI.
pub struct ScriptedExecutor {
    name: String,
}

impl ScriptedExecutor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Executor for ScriptedExecutor {
    async fn execute(&self, input: ExecutorInput) -> ExecutorReply {
        if let Some(Value::Bool(true)) = input.params.get("fail") {
            return ExecutorReply::failure(format!(
                "Scripted failure requested for step '{}'",
                input.step_name
            ));
        }

        info!(
            "Executor '{}' handling step '{}' (task {})",
            self.name, input.step_name, input.task_id
        );

        ExecutorReply::ok(json!({
            "executor": self.name,
            "step": input.step_name,
            "params": Value::Object(input.params),
        }))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
