// ABOUTME: Task router module matching work items to capable executors
// ABOUTME: Resolves work item kinds and selects executors via direct mapping or fuzzy scoring

pub mod matching;
pub mod table;

pub use table::{DirectMapping, KeywordRule, RouteTable, UNKNOWN_KIND};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::registry::{AgentRegistry, Catalog, ExecutorRecord};

/// Confidence assigned when a work item's kind hits the direct mapping table.
pub const DIRECT_MATCH_CONFIDENCE: f64 = 0.9;

/// Minimum token-overlap score for a fuzzy candidate to be considered.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.3;

/// A unit of routable intent. Ephemeral; exists only for the routing call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkItem {
    pub kind: Option<String>,
    pub description: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl WorkItem {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            kind: None,
            description: description.into(),
            params: Map::new(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

/// The outcome of a routing call. Immutable once produced; the embedded
/// executor record is a clone of registry state, never a live reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub task_id: String,
    pub executor: Option<ExecutorRecord>,
    pub reason: String,
    pub confidence: f64,
}

impl RoutingDecision {
    fn selected(executor: &ExecutorRecord, reason: String, confidence: f64) -> Self {
        Self {
            task_id: uuid::Uuid::new_v4().to_string(),
            executor: Some(executor.clone()),
            reason,
            confidence,
        }
    }

    fn unrouted(reason: String) -> Self {
        Self {
            task_id: uuid::Uuid::new_v4().to_string(),
            executor: None,
            reason,
            confidence: 0.0,
        }
    }

    pub fn is_routed(&self) -> bool {
        self.executor.is_some()
    }
}

/// Matches work items to executors over a registry snapshot.
///
/// Routing is a pure function of registry state and the input: no side
/// effects, no mutation of executor records. Each call takes a fresh
/// catalog snapshot, so a registry reload never tears an in-flight scan.
#[derive(Clone)]
pub struct TaskRouter {
    registry: Arc<AgentRegistry>,
    table: Arc<RouteTable>,
}

impl TaskRouter {
    pub fn new(registry: Arc<AgentRegistry>, table: RouteTable) -> Self {
        Self {
            registry,
            table: Arc::new(table),
        }
    }

    /// Select the best-matching executor for a work item.
    pub fn route(&self, item: &WorkItem) -> RoutingDecision {
        let catalog = self.registry.snapshot();
        let kind = self.resolve_kind(item);

        debug!("Routing work item as kind '{}'", kind);

        if let Some(mapping) = self.table.direct(&kind) {
            return self.route_direct(&catalog, &kind, mapping);
        }

        self.route_fuzzy(&catalog, item)
    }

    /// Resolve the item's kind: explicit field first, then the keyword
    /// table (first matching rule wins, in table order), else `unknown`.
    fn resolve_kind(&self, item: &WorkItem) -> String {
        if let Some(ref kind) = item.kind {
            return kind.clone();
        }

        self.table
            .infer_kind(&item.description)
            .unwrap_or(UNKNOWN_KIND)
            .to_string()
    }

    fn route_direct(
        &self,
        catalog: &Catalog,
        kind: &str,
        mapping: &DirectMapping,
    ) -> RoutingDecision {
        match catalog.find(&mapping.executor, Some(&mapping.category)) {
            Some(record) => RoutingDecision::selected(
                record,
                format!("Direct mapping for kind '{}'", kind),
                DIRECT_MATCH_CONFIDENCE,
            ),
            None => RoutingDecision::unrouted(format!(
                "Kind '{}' maps to executor '{}' ({}), which is not routable in the registry",
                kind, mapping.executor, mapping.category
            )),
        }
    }

    fn route_fuzzy(&self, catalog: &Catalog, item: &WorkItem) -> RoutingDecision {
        let item_tokens = matching::description_tokens(&item.description);

        if item_tokens.is_empty() {
            return RoutingDecision::unrouted(
                "Work item description has no tokens to match against".to_string(),
            );
        }

        // Stable selection: candidates are scanned in catalog order, and a
        // later candidate replaces an earlier one only on a strictly higher
        // score. Equal scores resolve to the first-cataloged executor.
        let mut best: Option<(&ExecutorRecord, f64)> = None;
        for record in catalog.routable() {
            let candidate_tokens = matching::executor_tokens(record);
            let score = matching::overlap_score(&item_tokens, &candidate_tokens);

            if score < FUZZY_MATCH_THRESHOLD {
                continue;
            }

            if best.map_or(true, |(_, existing)| score > existing) {
                best = Some((record, score));
            }
        }

        match best {
            Some((record, score)) => RoutingDecision::selected(
                record,
                format!(
                    "Fuzzy match on description (score {:.2}, threshold {:.2})",
                    score, FUZZY_MATCH_THRESHOLD
                ),
                score,
            ),
            None => RoutingDecision::unrouted(format!(
                "No executor scored above the {:.2} fuzzy-match threshold",
                FUZZY_MATCH_THRESHOLD
            )),
        }
    }
}
