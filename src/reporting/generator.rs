// ABOUTME: Report generators rendering workflow runs as text
// ABOUTME: Summary and detailed renderers over recorded step outcomes

use crate::engine::{WorkflowInstance, WorkflowStatus};

pub trait ReportGenerator: Send + Sync {
    fn generate(&self, workflow: &WorkflowInstance) -> String;

    fn report_type(&self) -> &'static str;
}

/// Concise run overview: status header, progress counts, and any failures.
pub struct SummaryGenerator;

impl SummaryGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SummaryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for SummaryGenerator {
    fn generate(&self, workflow: &WorkflowInstance) -> String {
        let report = workflow.status_report();
        let summary = workflow.outcome_summary();

        let mut content = format!(
            "Workflow: {} ({})\n\
             Status: {}\n\
             Progress: {}/{} steps ({:.0}%)\n\
             Created: {}\n",
            workflow.name,
            workflow.id,
            report.status,
            report.current_step,
            report.total_steps,
            report.progress * 100.0,
            workflow.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );

        if let Some(started) = workflow.started_at {
            content.push_str(&format!(
                "Started: {}\n",
                started.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        if let Some(completed) = workflow.completed_at {
            content.push_str(&format!(
                "Completed: {}\n",
                completed.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        if let Some(failed) = workflow.failed_at {
            content.push_str(&format!(
                "Failed: {}\n",
                failed.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }

        content.push_str(&format!(
            "Outcomes: {} succeeded, {} failed ({} tolerated)\n",
            summary.succeeded, summary.failed, summary.tolerated_failures
        ));

        if let Some(ref error) = workflow.error {
            content.push_str(&format!("Error: {}\n", error));
        }

        let failures: Vec<_> = workflow.results.iter().filter(|r| !r.success).collect();
        if !failures.is_empty() {
            content.push_str("\nFailed steps:\n");
            for outcome in failures {
                content.push_str(&format!(
                    "  - {} ({}): {}\n",
                    outcome.step_name,
                    outcome.step_index,
                    outcome.error.as_deref().unwrap_or("unknown error")
                ));
            }
        }

        content
    }

    fn report_type(&self) -> &'static str {
        "summary"
    }
}

/// Full audit view: every recorded outcome with executor, timing, and a
/// payload or error excerpt.
pub struct DetailedGenerator;

impl DetailedGenerator {
    pub fn new() -> Self {
        Self
    }

    fn excerpt(text: &str) -> String {
        if text.len() > 200 {
            format!("{}...", &text[..200])
        } else {
            text.to_string()
        }
    }
}

impl Default for DetailedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for DetailedGenerator {
    fn generate(&self, workflow: &WorkflowInstance) -> String {
        let mut content = SummaryGenerator::new().generate(workflow);
        content.push_str("\nStep outcomes:\n");

        for outcome in &workflow.results {
            let marker = if outcome.success { "ok" } else { "FAILED" };
            content.push_str(&format!(
                "  [{}] {} (step {})",
                marker, outcome.step_name, outcome.step_index
            ));

            if let Some(ref executor) = outcome.routed_to {
                content.push_str(&format!(" via {}", executor));
            }
            if let Some(duration) = outcome.duration {
                content.push_str(&format!(" in {:.2}s", duration.as_secs_f64()));
            }
            content.push('\n');

            if let Some(ref payload) = outcome.payload {
                content.push_str(&format!("      payload: {}\n", Self::excerpt(&payload.to_string())));
            }
            if let Some(ref error) = outcome.error {
                content.push_str(&format!("      error: {}\n", Self::excerpt(error)));
            }
        }

        if workflow.results.len() < workflow.steps.len()
            && workflow.status == WorkflowStatus::Failed
        {
            content.push_str(&format!(
                "\n{} step(s) never started due to the halt.\n",
                workflow.steps.len() - workflow.results.len()
            ));
        }

        content
    }

    fn report_type(&self) -> &'static str {
        "detailed"
    }
}
