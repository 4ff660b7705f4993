// ABOUTME: Step outcome recording and workflow status reporting types
// ABOUTME: Defines per-step results, the progress view, and outcome aggregation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::workflow::WorkflowStatus;

/// Recorded outcome of one step. Appended to the workflow's audit trail in
/// deterministic step order; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step_index: usize,
    pub step_name: String,
    pub recorded_at: DateTime<Utc>,
    pub success: bool,
    pub payload: Option<Value>,
    pub error: Option<String>,
    pub duration: Option<Duration>,
    /// Name of the executor the router selected, when routing succeeded.
    pub routed_to: Option<String>,
}

impl StepOutcome {
    pub fn success(step_index: usize, step_name: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            step_index,
            step_name: step_name.into(),
            recorded_at: Utc::now(),
            success: true,
            payload,
            error: None,
            duration: None,
            routed_to: None,
        }
    }

    pub fn failure(
        step_index: usize,
        step_name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            step_index,
            step_name: step_name.into(),
            recorded_at: Utc::now(),
            success: false,
            payload: None,
            error: Some(error.into()),
            duration: None,
            routed_to: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_executor(mut self, name: impl Into<String>) -> Self {
        self.routed_to = Some(name.into());
        self
    }
}

/// Read-only progress view over a workflow instance.
///
/// `current_step` is the count of steps with a recorded outcome, not an
/// index into the declared order: under concurrent execution a single
/// cursor position is meaningless, a completed count is not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub id: String,
    pub name: String,
    pub status: WorkflowStatus,
    pub current_step: usize,
    pub total_steps: usize,
    pub progress: f64,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Aggregated outcome counts for reporting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub total_steps: usize,
    pub recorded: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub tolerated_failures: usize,
}
