// ABOUTME: Integration tests for workflow engine execution semantics
// ABOUTME: Covers dependency ordering, concurrency, partial failure, and halting

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{event_log, events, position, routing_fixture, tracking_set, TrackingExecutor};
use switchyard::engine::{EngineError, StepDefinition, WorkflowEngine, WorkflowSpec};
use switchyard::executors::ExecutorSet;
use switchyard::store::MemoryRunStore;
use switchyard::WorkflowStatus;

fn three_kinds() -> Vec<(&'static str, &'static str)> {
    vec![
        ("structure-agent", "structure"),
        ("copy-agent", "copy"),
        ("evaluation-agent", "evaluation"),
    ]
}

#[tokio::test]
async fn test_join_step_waits_for_both_dependencies() {
    let log = event_log();
    let engine = WorkflowEngine::new(
        routing_fixture(&three_kinds()),
        tracking_set(
            &["structure-agent", "copy-agent", "evaluation-agent"],
            &log,
        ),
        Arc::new(MemoryRunStore::new()),
    );

    // A and B are independent; C joins them.
    let spec = WorkflowSpec::new(
        "join",
        vec![
            StepDefinition::new("a", "structure").with_parallel_group("fanout"),
            StepDefinition::new("b", "copy").with_parallel_group("fanout"),
            StepDefinition::new("c", "evaluation").with_dependencies(vec!["a", "b"]),
        ],
    );

    let workflow = engine.create_workflow(spec).await.unwrap();
    let finished = engine.run(workflow).await.unwrap();

    assert_eq!(finished.status, WorkflowStatus::Completed);
    assert_eq!(finished.results.len(), 3);

    // C must not start until both A and B have finished and recorded.
    let log = events(&log);
    let c_start = position(&log, "start:c");
    assert!(position(&log, "end:a") < c_start);
    assert!(position(&log, "end:b") < c_start);
}

#[tokio::test]
async fn test_parallel_group_members_overlap() {
    let log = event_log();

    let mut set = ExecutorSet::new();
    set.bind(Arc::new(
        TrackingExecutor::new("structure-agent", Arc::clone(&log))
            .with_delay(Duration::from_millis(100)),
    ));
    set.bind(Arc::new(
        TrackingExecutor::new("copy-agent", Arc::clone(&log))
            .with_delay(Duration::from_millis(100)),
    ));

    let engine = WorkflowEngine::new(
        routing_fixture(&three_kinds()),
        set,
        Arc::new(MemoryRunStore::new()),
    )
    .with_max_concurrent(4);

    let spec = WorkflowSpec::new(
        "overlap",
        vec![
            StepDefinition::new("a", "structure").with_parallel_group("pair"),
            StepDefinition::new("b", "copy").with_parallel_group("pair"),
        ],
    );

    let workflow = engine.create_workflow(spec).await.unwrap();
    let finished = engine.run(workflow).await.unwrap();
    assert_eq!(finished.status, WorkflowStatus::Completed);

    // Both steps started before either ended: they ran concurrently.
    let log = events(&log);
    let first_end = position(&log, "end:a").min(position(&log, "end:b"));
    let last_start = position(&log, "start:a").max(position(&log, "start:b"));
    assert!(
        last_start < first_end,
        "expected overlapping execution, got {:?}",
        log
    );
}

#[tokio::test]
async fn test_ungrouped_independent_steps_run_sequentially() {
    let log = event_log();
    let engine = WorkflowEngine::new(
        routing_fixture(&three_kinds()),
        tracking_set(&["structure-agent", "copy-agent"], &log),
        Arc::new(MemoryRunStore::new()),
    );

    let spec = WorkflowSpec::new(
        "sequential",
        vec![
            StepDefinition::new("a", "structure"),
            StepDefinition::new("b", "copy"),
        ],
    );

    let workflow = engine.create_workflow(spec).await.unwrap();
    engine.run(workflow).await.unwrap();

    // Without a shared parallel group, declared order is execution order.
    assert_eq!(
        events(&log),
        vec!["start:a", "end:a", "start:b", "end:b"]
    );
}

#[tokio::test]
async fn test_cycle_fails_creation_and_nothing_executes() {
    let log = event_log();
    let engine = WorkflowEngine::new(
        routing_fixture(&three_kinds()),
        tracking_set(&["structure-agent", "copy-agent"], &log),
        Arc::new(MemoryRunStore::new()),
    );

    let spec = WorkflowSpec::new(
        "cyclic",
        vec![
            StepDefinition::new("a", "structure").with_dependencies(vec!["b"]),
            StepDefinition::new("b", "copy").with_dependencies(vec!["a"]),
        ],
    );

    let result = engine.create_workflow(spec).await;
    assert!(matches!(result, Err(EngineError::CircularDependency { .. })));
    assert!(events(&log).is_empty());
}

#[tokio::test]
async fn test_unknown_dependency_fails_creation() {
    let engine = WorkflowEngine::new(
        routing_fixture(&three_kinds()),
        ExecutorSet::new(),
        Arc::new(MemoryRunStore::new()),
    );

    let spec = WorkflowSpec::new(
        "dangling",
        vec![StepDefinition::new("a", "structure").with_dependencies(vec!["missing"])],
    );

    let result = engine.create_workflow(spec).await;
    assert!(matches!(
        result,
        Err(EngineError::DependencyError { step, dependency })
            if step == "a" && dependency == "missing"
    ));
}

#[tokio::test]
async fn test_halt_skips_downstream_steps() {
    let log = event_log();

    let mut set = ExecutorSet::new();
    set.bind(Arc::new(
        TrackingExecutor::new("structure-agent", Arc::clone(&log)).failing(),
    ));
    set.bind(Arc::new(TrackingExecutor::new(
        "copy-agent",
        Arc::clone(&log),
    )));

    let engine = WorkflowEngine::new(
        routing_fixture(&three_kinds()),
        set,
        Arc::new(MemoryRunStore::new()),
    );

    let spec = WorkflowSpec::new(
        "halting",
        vec![
            StepDefinition::new("a", "structure"),
            StepDefinition::new("b", "copy").with_dependencies(vec!["a"]),
        ],
    );

    let workflow = engine.create_workflow(spec).await.unwrap();
    let finished = engine.run(workflow).await.unwrap();

    assert_eq!(finished.status, WorkflowStatus::Failed);
    assert_eq!(finished.results.len(), 1);
    assert!(finished.error.as_ref().unwrap().contains("'a'"));

    // The dependent step never started.
    let log = events(&log);
    assert!(!log.iter().any(|e| e == "start:b"));
}

#[tokio::test]
async fn test_tolerated_failure_lets_dependents_run() {
    let log = event_log();

    let mut set = ExecutorSet::new();
    set.bind(Arc::new(
        TrackingExecutor::new("structure-agent", Arc::clone(&log)).failing(),
    ));
    set.bind(Arc::new(TrackingExecutor::new(
        "copy-agent",
        Arc::clone(&log),
    )));

    let engine = WorkflowEngine::new(
        routing_fixture(&three_kinds()),
        set,
        Arc::new(MemoryRunStore::new()),
    );

    let spec = WorkflowSpec::new(
        "tolerant",
        vec![
            StepDefinition::new("a", "structure").with_continue_on_error(),
            StepDefinition::new("b", "copy").with_dependencies(vec!["a"]),
        ],
    );

    let workflow = engine.create_workflow(spec).await.unwrap();
    let finished = engine.run(workflow).await.unwrap();

    // The tolerated failure is recorded, the dependent still ran, and the
    // workflow reached a completed terminal state.
    assert_eq!(finished.status, WorkflowStatus::Completed);
    assert_eq!(finished.results.len(), 2);
    assert!(!finished.results[0].success);
    assert!(finished.results[1].success);
    assert!(events(&log).iter().any(|e| e == "end:b"));
}

#[tokio::test]
async fn test_results_recorded_in_declared_order_despite_concurrency() {
    let log = event_log();

    // The first group member is much slower than the second, so completion
    // order inverts declared order.
    let mut set = ExecutorSet::new();
    set.bind(Arc::new(
        TrackingExecutor::new("structure-agent", Arc::clone(&log))
            .with_delay(Duration::from_millis(150)),
    ));
    set.bind(Arc::new(TrackingExecutor::new(
        "copy-agent",
        Arc::clone(&log),
    )));

    let engine = WorkflowEngine::new(
        routing_fixture(&three_kinds()),
        set,
        Arc::new(MemoryRunStore::new()),
    );

    let spec = WorkflowSpec::new(
        "ordered",
        vec![
            StepDefinition::new("slow", "structure").with_parallel_group("pair"),
            StepDefinition::new("fast", "copy").with_parallel_group("pair"),
        ],
    );

    let workflow = engine.create_workflow(spec).await.unwrap();
    let finished = engine.run(workflow).await.unwrap();

    let recorded: Vec<&str> = finished
        .results
        .iter()
        .map(|r| r.step_name.as_str())
        .collect();
    assert_eq!(recorded, vec!["slow", "fast"]);
    assert_eq!(finished.results[0].step_index, 0);
    assert_eq!(finished.results[1].step_index, 1);
}

#[tokio::test]
async fn test_status_view_reflects_progress() {
    let engine = WorkflowEngine::new(
        routing_fixture(&three_kinds()),
        tracking_set(&["structure-agent"], &event_log()),
        Arc::new(MemoryRunStore::new()),
    );

    let spec = WorkflowSpec::new(
        "status_view",
        vec![StepDefinition::new("a", "structure")],
    );

    let workflow = engine.create_workflow(spec).await.unwrap();
    let id = workflow.id.clone();

    let created = engine.status(&id).await.unwrap();
    assert_eq!(created.status, WorkflowStatus::Created);
    assert_eq!(created.progress, 0.0);

    engine.run(workflow).await.unwrap();

    let completed = engine.status(&id).await.unwrap();
    assert_eq!(completed.status, WorkflowStatus::Completed);
    assert_eq!(completed.current_step, 1);
    assert_eq!(completed.progress, 1.0);
    assert!(completed.completed_at.is_some());
}

#[tokio::test]
async fn test_status_for_unknown_workflow() {
    let engine = WorkflowEngine::new(
        routing_fixture(&three_kinds()),
        ExecutorSet::new(),
        Arc::new(MemoryRunStore::new()),
    );

    let result = engine.status("not-a-real-id").await;
    assert!(matches!(result, Err(EngineError::WorkflowNotFound { .. })));
}
