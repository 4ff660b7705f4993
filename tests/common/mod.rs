// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides tracking executors, a recording store, and registry fixtures

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use switchyard::engine::WorkflowInstance;
use switchyard::executors::{Executor, ExecutorInput, ExecutorReply, ExecutorSet};
use switchyard::registry::{AgentRegistry, Catalog, ComplianceStatus, ExecutorRecord};
use switchyard::router::{DirectMapping, RouteTable, TaskRouter};
use switchyard::store::{MemoryRunStore, RunStore};

/// Executor that appends start/end events to a shared log, optionally
/// sleeping or failing, so tests can assert ordering and overlap.
pub struct TrackingExecutor {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    fail: bool,
}

impl TrackingExecutor {
    pub fn new(name: &str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            log,
            delay: None,
            fail: false,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl Executor for TrackingExecutor {
    async fn execute(&self, input: ExecutorInput) -> ExecutorReply {
        self.log
            .lock()
            .unwrap()
            .push(format!("start:{}", input.step_name));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.log
            .lock()
            .unwrap()
            .push(format!("end:{}", input.step_name));

        if self.fail {
            ExecutorReply::failure(format!("tracked failure in {}", input.step_name))
        } else {
            ExecutorReply::ok(json!({ "handled_by": self.name, "step": input.step_name }))
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Store wrapper that snapshots the recorded result names at every save,
/// so tests can assert the durable log only ever grows by appending.
pub struct RecordingStore {
    inner: MemoryRunStore,
    pub saves: Mutex<Vec<Vec<String>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryRunStore::new(),
            saves: Mutex::new(Vec::new()),
        }
    }

    pub fn saved_result_names(&self) -> Vec<Vec<String>> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl RunStore for RecordingStore {
    async fn save(&self, workflow: &WorkflowInstance) -> switchyard::store::Result<()> {
        self.saves.lock().unwrap().push(
            workflow
                .results
                .iter()
                .map(|r| r.step_name.clone())
                .collect(),
        );
        self.inner.save(workflow).await
    }

    async fn load(&self, id: &str) -> switchyard::store::Result<Option<WorkflowInstance>> {
        self.inner.load(id).await
    }

    async fn load_all(&self) -> switchyard::store::Result<Vec<WorkflowInstance>> {
        self.inner.load_all().await
    }
}

/// Registry with one registered executor per (name, kind) pair and a route
/// table mapping each kind directly to it.
pub fn routing_fixture(kinds: &[(&str, &str)]) -> TaskRouter {
    let records = kinds
        .iter()
        .map(|(name, _)| {
            ExecutorRecord::new(
                *name,
                "core",
                ComplianceStatus::Registered,
                format!("handles {} work", name),
            )
        })
        .collect();

    let mut table = RouteTable::default();
    for (name, kind) in kinds {
        table = table.with_direct(*kind, DirectMapping::new("core", *name));
    }

    TaskRouter::new(
        Arc::new(AgentRegistry::in_memory(Catalog::from_records(records))),
        table,
    )
}

/// One tracking executor per name, all sharing the given event log.
pub fn tracking_set(names: &[&str], log: &Arc<Mutex<Vec<String>>>) -> ExecutorSet {
    let mut set = ExecutorSet::new();
    for name in names {
        set.bind(Arc::new(TrackingExecutor::new(name, Arc::clone(log))));
    }
    set
}

pub fn event_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn position(events: &[String], needle: &str) -> usize {
    events
        .iter()
        .position(|e| e == needle)
        .unwrap_or_else(|| panic!("event '{}' not found in {:?}", needle, events))
}

/// Simple payload-echoing executor reply for closures.
pub fn ok_payload(step: &str) -> Value {
    json!({ "step": step })
}
