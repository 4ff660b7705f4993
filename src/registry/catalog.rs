// ABOUTME: Executor record and catalog data structures
// ABOUTME: Defines compliance states and read-only lookup over registered executors

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Compliance state of an executor in the catalog.
///
/// Both `Registered` and `FailedCompliance` executors are routable:
/// degraded executors stay reachable rather than being silently dropped,
/// so callers can still dispatch to them and surface the degradation
/// through their own policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    PendingCompliance,
    Registered,
    FailedCompliance,
}

impl ComplianceStatus {
    pub fn is_routable(&self) -> bool {
        matches!(
            self,
            ComplianceStatus::Registered | ComplianceStatus::FailedCompliance
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::PendingCompliance => "pending_compliance",
            ComplianceStatus::Registered => "registered",
            ComplianceStatus::FailedCompliance => "failed_compliance",
        }
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of one executor as persisted by the onboarding process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorRecord {
    pub name: String,
    pub category: String,
    pub status: ComplianceStatus,
    #[serde(default)]
    pub description: String,
}

impl ExecutorRecord {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        status: ComplianceStatus,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            status,
            description: description.into(),
        }
    }
}

/// Immutable, insertion-ordered set of executor records.
///
/// Insertion order is preserved because it is the tiebreak order for
/// fuzzy routing: equal-scoring candidates resolve to whichever record
/// was cataloged first.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: IndexMap<String, ExecutorRecord>,
}

impl Catalog {
    pub fn from_records(records: Vec<ExecutorRecord>) -> Self {
        let mut map = IndexMap::with_capacity(records.len());
        for record in records {
            if map.contains_key(&record.name) {
                warn!("Duplicate executor record '{}', keeping latest", record.name);
            }
            map.insert(record.name.clone(), record);
        }
        Self { records: map }
    }

    /// Look up a routable executor by name, optionally constrained to a category.
    ///
    /// Executors that are `pending_compliance` are invisible here; executors
    /// that exist under another category are treated as absent.
    pub fn find(&self, name: &str, category: Option<&str>) -> Option<&ExecutorRecord> {
        let record = self.records.get(name)?;

        if !record.status.is_routable() {
            return None;
        }

        if let Some(category) = category {
            if record.category != category {
                return None;
            }
        }

        Some(record)
    }

    /// Look up a record regardless of compliance state.
    pub fn get(&self, name: &str) -> Option<&ExecutorRecord> {
        self.records.get(name)
    }

    /// All routable records, in catalog order.
    pub fn routable(&self) -> impl Iterator<Item = &ExecutorRecord> {
        self.records.values().filter(|r| r.status.is_routable())
    }

    /// All records, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ExecutorRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
