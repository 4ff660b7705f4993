// ABOUTME: Workflow instance state machine and audit trail
// ABOUTME: Owns status transitions, recorded outcomes, and the progress view

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::result::{OutcomeSummary, StatusReport, StepOutcome};
use super::step::{StepDefinition, WorkflowSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Created,
    Running,
    Completed,
    Failed,
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Created => "created",
            WorkflowStatus::Running => "running",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single run of a step list, with its append-only audit trail.
///
/// Steps are immutable after creation. Mutation happens only through the
/// engine's coordinating task; the instance is never shared mutably with
/// step workers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowInstance {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: WorkflowStatus,
    pub steps: Vec<StepDefinition>,
    pub results: Vec<StepOutcome>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
}

impl WorkflowInstance {
    pub fn new(spec: WorkflowSpec) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: spec.name,
            description: spec.description,
            status: WorkflowStatus::Created,
            steps: spec.steps,
            results: Vec::new(),
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            failed_at: None,
        }
    }

    /// Transition created -> running. Any other transition is refused.
    pub fn mark_running(&mut self) {
        if self.status != WorkflowStatus::Created {
            warn!(
                "Refusing transition {} -> running for workflow {}",
                self.status, self.id
            );
            return;
        }
        self.status = WorkflowStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Transition running -> completed. Terminal states never change.
    pub fn mark_completed(&mut self) {
        if self.status != WorkflowStatus::Running {
            warn!(
                "Refusing transition {} -> completed for workflow {}",
                self.status, self.id
            );
            return;
        }
        self.status = WorkflowStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Transition created/running -> failed with a terminal error.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        if self.status.is_terminal() {
            warn!(
                "Refusing transition {} -> failed for workflow {}",
                self.status, self.id
            );
            return;
        }
        self.status = WorkflowStatus::Failed;
        self.failed_at = Some(Utc::now());
        self.error = Some(error.into());
    }

    /// Append one recorded outcome. The results list never exceeds the
    /// step list and an index is recorded at most once.
    pub fn record(&mut self, outcome: StepOutcome) {
        debug_assert!(outcome.step_index < self.steps.len());
        debug_assert!(
            !self
                .results
                .iter()
                .any(|r| r.step_index == outcome.step_index),
            "step {} recorded twice",
            outcome.step_index
        );
        self.results.push(outcome);
    }

    /// Count of steps with a recorded outcome — the progress cursor.
    pub fn steps_completed(&self) -> usize {
        self.results.len()
    }

    pub fn outcome_for(&self, step_index: usize) -> Option<&StepOutcome> {
        self.results.iter().find(|r| r.step_index == step_index)
    }

    pub fn outcome_for_name(&self, step_name: &str) -> Option<&StepOutcome> {
        self.results.iter().find(|r| r.step_name == step_name)
    }

    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| !r.success)
    }

    pub fn status_report(&self) -> StatusReport {
        let total = self.steps.len();
        let recorded = self.results.len();
        let progress = if total == 0 {
            0.0
        } else {
            recorded as f64 / total as f64
        };

        StatusReport {
            id: self.id.clone(),
            name: self.name.clone(),
            status: self.status,
            current_step: recorded,
            total_steps: total,
            progress,
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            failed_at: self.failed_at,
            error: self.error.clone(),
        }
    }

    pub fn outcome_summary(&self) -> OutcomeSummary {
        let succeeded = self.results.iter().filter(|r| r.success).count();
        let failed = self.results.len() - succeeded;
        let tolerated = self
            .results
            .iter()
            .filter(|r| !r.success && self.steps[r.step_index].continue_on_error)
            .count();

        OutcomeSummary {
            total_steps: self.steps.len(),
            recorded: self.results.len(),
            succeeded,
            failed,
            tolerated_failures: tolerated,
        }
    }
}
