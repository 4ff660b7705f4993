// ABOUTME: Workflow engine coordinating validation, routing, execution, and persistence
// ABOUTME: Runs dependency batches with bounded concurrency and records outcomes in step order

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::{mpsc, Semaphore};
use tokio::time::{timeout, Instant};
use tracing::{debug, error, info, instrument, warn};

use super::error::{EngineError, Result};
use super::graph::StepGraph;
use super::result::{StatusReport, StepOutcome};
use super::step::{StepDefinition, WorkflowSpec};
use super::workflow::{WorkflowInstance, WorkflowStatus};
use crate::executors::{ExecutorInput, ExecutorSet};
use crate::router::{TaskRouter, WorkItem};
use crate::store::RunStore;

const DEFAULT_MAX_CONCURRENT: usize = 4;
const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(3600);

/// Orchestrates workflow runs.
///
/// The engine owns each `WorkflowInstance` exclusively while it runs: step
/// workers never touch shared state, they report outcomes over a channel
/// and the coordinating task appends them in declared-index order, saving
/// after every append so the durable log is always a consistent prefix.
pub struct WorkflowEngine {
    runner: StepRunner,
    store: Arc<dyn RunStore>,
    semaphore: Arc<Semaphore>,
}

impl WorkflowEngine {
    pub fn new(router: TaskRouter, executors: ExecutorSet, store: Arc<dyn RunStore>) -> Self {
        Self {
            runner: StepRunner {
                router,
                executors,
                default_timeout: DEFAULT_STEP_TIMEOUT,
            },
            store,
            semaphore: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT)),
        }
    }

    /// Cap the number of concurrently executing steps.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
        self
    }

    /// Timeout applied to steps that declare none of their own.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.runner.default_timeout = timeout;
        self
    }

    /// Validate a spec without creating anything: structure, dependency
    /// resolution, and acyclicity.
    pub fn validate(&self, spec: &WorkflowSpec) -> Result<()> {
        spec.validate_structure()?;
        let graph = StepGraph::build(&spec.steps)?;
        graph.execution_plan()?;
        Ok(())
    }

    /// Create a workflow instance from a validated spec and persist it
    /// immediately, so a crash before execution still leaves a record.
    pub async fn create_workflow(&self, spec: WorkflowSpec) -> Result<WorkflowInstance> {
        self.validate(&spec)?;

        let workflow = WorkflowInstance::new(spec);
        self.store.save(&workflow).await?;

        info!(
            "Created workflow '{}' ({}, {} steps)",
            workflow.name,
            workflow.id,
            workflow.steps.len()
        );
        Ok(workflow)
    }

    /// Execute a created workflow to a terminal status.
    ///
    /// Validation failures and step failures land in the instance's
    /// `status`/`error` fields — the returned instance is the source of
    /// truth. Only persistence failures surface as `Err`.
    #[instrument(skip(self, workflow), fields(workflow_id = %workflow.id, workflow_name = %workflow.name))]
    pub async fn run(&self, mut workflow: WorkflowInstance) -> Result<WorkflowInstance> {
        if workflow.status != WorkflowStatus::Created {
            return Err(EngineError::NotRunnable {
                id: workflow.id.clone(),
                status: workflow.status.to_string(),
            });
        }

        // Defensive re-validation: create_workflow checked this, but the
        // instance may have been deserialized from elsewhere.
        let plan = match StepGraph::build(&workflow.steps).and_then(|g| g.execution_plan()) {
            Ok(plan) => plan,
            Err(validation_error) => {
                error!("Workflow {} failed validation: {}", workflow.id, validation_error);
                workflow.mark_failed(validation_error.to_string());
                self.store.save(&workflow).await?;
                return Ok(workflow);
            }
        };

        info!(
            "Executing workflow '{}': {} batches, {} steps, max parallelism {}",
            workflow.name,
            plan.execution_depth(),
            plan.total_steps,
            plan.max_parallelism()
        );

        workflow.mark_running();
        self.store.save(&workflow).await?;

        // Data values produced by completed steps, keyed by output name.
        let mut data_values: HashMap<String, Value> = HashMap::new();

        for batch in &plan.batches {
            for unit in partition_units(&workflow.steps, batch) {
                let outcomes = match unit {
                    ExecutionUnit::Solo(index) => {
                        vec![self.run_solo(&workflow, index, &data_values).await]
                    }
                    ExecutionUnit::Group(indices) => {
                        self.run_group(&workflow, &indices, &data_values).await
                    }
                };

                for outcome in outcomes {
                    let step = &workflow.steps[outcome.step_index];
                    let tolerated = step.continue_on_error;
                    let halting = !outcome.success && !tolerated;
                    let step_name = step.name.clone();
                    let error_text = outcome.error.clone();

                    if outcome.success {
                        stash_outputs(step, &outcome, &mut data_values);
                    }

                    workflow.record(outcome);
                    self.store.save(&workflow).await?;

                    if halting {
                        let message = error_text.unwrap_or_else(|| "step failed".to_string());
                        warn!(
                            "Halting workflow {}: step '{}' failed without continue_on_error",
                            workflow.id, step_name
                        );
                        workflow.mark_failed(format!("Step '{}' failed: {}", step_name, message));
                        self.store.save(&workflow).await?;
                        return Ok(workflow);
                    }
                }
            }
        }

        workflow.mark_completed();
        self.store.save(&workflow).await?;

        info!(
            "Workflow '{}' completed ({} results)",
            workflow.name,
            workflow.results.len()
        );
        Ok(workflow)
    }

    /// Read-only progress view for a persisted workflow.
    pub async fn status(&self, id: &str) -> Result<StatusReport> {
        let workflow = self
            .store
            .load(id)
            .await?
            .ok_or_else(|| EngineError::WorkflowNotFound { id: id.to_string() })?;
        Ok(workflow.status_report())
    }

    /// Run one ungrouped step inline on the coordinator.
    async fn run_solo(
        &self,
        workflow: &WorkflowInstance,
        index: usize,
        data_values: &HashMap<String, Value>,
    ) -> StepOutcome {
        let step = &workflow.steps[index];
        match resolve_inputs(index, step, data_values) {
            Ok(params) => self.runner.run_step(index, step, params).await,
            Err(outcome) => outcome,
        }
    }

    /// Run a parallel group: workers execute under the semaphore and report
    /// outcomes over a channel; the coordinator restores declared order.
    async fn run_group(
        &self,
        workflow: &WorkflowInstance,
        indices: &[usize],
        data_values: &HashMap<String, Value>,
    ) -> Vec<StepOutcome> {
        let (tx, mut rx) = mpsc::channel::<StepOutcome>(indices.len().max(1));
        let mut outcomes = Vec::with_capacity(indices.len());
        let mut spawned = Vec::new();

        for &index in indices {
            let step = &workflow.steps[index];

            // Inputs resolve against the bag as it stood before the group
            // started; group members never see each other's outputs.
            let params = match resolve_inputs(index, step, data_values) {
                Ok(params) => params,
                Err(outcome) => {
                    outcomes.push(outcome);
                    continue;
                }
            };

            let runner = self.runner.clone();
            let semaphore = Arc::clone(&self.semaphore);
            let step = step.clone();
            let tx = tx.clone();
            spawned.push(index);

            tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("step semaphore closed");
                let outcome = runner.run_step(index, &step, params).await;
                let _ = tx.send(outcome).await;
            });
        }
        drop(tx);

        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }

        // A worker that died without reporting (panic) still gets a
        // recorded failure, so the audit trail stays complete.
        for &index in &spawned {
            if !outcomes.iter().any(|o| o.step_index == index) {
                let name = workflow.steps[index].name.clone();
                error!("Step worker for '{}' terminated without reporting", name);
                outcomes.push(StepOutcome::failure(
                    index,
                    name,
                    "Step worker terminated unexpectedly",
                ));
            }
        }

        outcomes.sort_by_key(|o| o.step_index);
        outcomes
    }
}

/// Routing plus executor invocation for a single step. Cheap to clone into
/// spawned workers; holds no workflow state.
#[derive(Clone)]
struct StepRunner {
    router: TaskRouter,
    executors: ExecutorSet,
    default_timeout: Duration,
}

impl StepRunner {
    async fn run_step(
        &self,
        index: usize,
        step: &StepDefinition,
        params: Map<String, Value>,
    ) -> StepOutcome {
        let start = Instant::now();

        debug!("Executing step '{}' (kind: {})", step.name, step.kind);

        let description = if step.description.is_empty() {
            step.name.clone()
        } else {
            step.description.clone()
        };
        let item = WorkItem {
            kind: Some(step.kind.clone()),
            description,
            params: params.clone(),
        };

        let decision = self.router.route(&item);
        let Some(record) = decision.executor else {
            warn!("No executor for step '{}': {}", step.name, decision.reason);
            return StepOutcome::failure(
                index,
                &step.name,
                format!("No executor available: {}", decision.reason),
            )
            .with_duration(start.elapsed());
        };

        let Some(executor) = self.executors.get(&record.name) else {
            warn!(
                "Executor '{}' selected for step '{}' but no implementation is bound",
                record.name, step.name
            );
            return StepOutcome::failure(
                index,
                &step.name,
                format!("Executor '{}' is not bound to an implementation", record.name),
            )
            .with_duration(start.elapsed());
        };

        let input = ExecutorInput {
            task_id: decision.task_id,
            step_name: step.name.clone(),
            params,
        };

        let step_timeout = step.timeout.unwrap_or(self.default_timeout);
        let outcome = match timeout(step_timeout, executor.execute(input)).await {
            Ok(reply) if reply.success => {
                info!("Step '{}' completed via '{}'", step.name, record.name);
                StepOutcome::success(index, &step.name, reply.payload)
            }
            Ok(reply) => {
                let message = reply
                    .error
                    .unwrap_or_else(|| "executor reported failure".to_string());
                error!("Step '{}' failed: {}", step.name, message);
                StepOutcome::failure(index, &step.name, message)
            }
            Err(_) => {
                error!("Step '{}' timed out after {:?}", step.name, step_timeout);
                StepOutcome::failure(
                    index,
                    &step.name,
                    format!("Step timed out after {:?}", step_timeout),
                )
            }
        };

        outcome
            .with_executor(&record.name)
            .with_duration(start.elapsed())
    }
}

enum ExecutionUnit {
    Solo(usize),
    Group(Vec<usize>),
}

/// Split a dependency batch into execution units: steps sharing a
/// `parallel_group` tag run concurrently, ungrouped steps run one at a
/// time, all in first-appearance order.
fn partition_units(steps: &[StepDefinition], batch: &[usize]) -> Vec<ExecutionUnit> {
    let mut units: Vec<ExecutionUnit> = Vec::new();
    let mut group_positions: HashMap<&str, usize> = HashMap::new();

    for &index in batch {
        match steps[index].parallel_group.as_deref() {
            None => units.push(ExecutionUnit::Solo(index)),
            Some(tag) => match group_positions.get(tag) {
                Some(&position) => {
                    if let ExecutionUnit::Group(members) = &mut units[position] {
                        members.push(index);
                    }
                }
                None => {
                    group_positions.insert(tag, units.len());
                    units.push(ExecutionUnit::Group(vec![index]));
                }
            },
        }
    }

    units
}

/// Merge a step's declared inputs into its params. A missing input is a
/// data-flow failure recorded against the step.
fn resolve_inputs(
    index: usize,
    step: &StepDefinition,
    data_values: &HashMap<String, Value>,
) -> std::result::Result<Map<String, Value>, StepOutcome> {
    let mut params = step.params.clone();

    for input in &step.inputs {
        match data_values.get(input) {
            Some(value) => {
                params.insert(input.clone(), value.clone());
            }
            None => {
                return Err(StepOutcome::failure(
                    index,
                    &step.name,
                    EngineError::DataFlowError {
                        step: step.name.clone(),
                        input: input.clone(),
                    }
                    .to_string(),
                ));
            }
        }
    }

    Ok(params)
}

/// Publish a successful step's payload under each declared output key.
/// When the payload is an object that carries the key, the member value is
/// published; otherwise the whole payload is.
fn stash_outputs(
    step: &StepDefinition,
    outcome: &StepOutcome,
    data_values: &mut HashMap<String, Value>,
) {
    for output in &step.outputs {
        let value = match &outcome.payload {
            Some(Value::Object(map)) if map.contains_key(output) => map[output].clone(),
            Some(payload) => payload.clone(),
            None => Value::Null,
        };
        data_values.insert(output.clone(), value);
    }
}
