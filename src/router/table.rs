// ABOUTME: Route table definitions for kind inference and direct executor mappings
// ABOUTME: Order-preserving keyword rules and kind-to-executor lookup tables

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind assigned to work items nothing in the keyword table recognizes.
pub const UNKNOWN_KIND: &str = "unknown";

/// One kind-inference rule: if any keyword occurs in the (lower-cased)
/// work item description, the item resolves to `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keywords: Vec<String>,
    pub kind: String,
}

impl KeywordRule {
    pub fn new<K: Into<String>>(keywords: Vec<K>, kind: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            kind: kind.into(),
        }
    }
}

/// Target of a direct kind mapping: the executor is looked up by exact
/// name within the given category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectMapping {
    pub category: String,
    pub executor: String,
}

impl DirectMapping {
    pub fn new(category: impl Into<String>, executor: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            executor: executor.into(),
        }
    }
}

/// Static routing tables supplied at router construction.
///
/// Rule and mapping order is semantic: kind inference takes the first
/// matching keyword rule, so earlier rules win ties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default)]
    pub keywords: Vec<KeywordRule>,
    #[serde(default)]
    pub direct: IndexMap<String, DirectMapping>,
}

impl RouteTable {
    pub fn with_keyword_rule(mut self, rule: KeywordRule) -> Self {
        self.keywords.push(rule);
        self
    }

    pub fn with_direct(mut self, kind: impl Into<String>, mapping: DirectMapping) -> Self {
        self.direct.insert(kind.into(), mapping);
        self
    }

    /// Infer a kind from free text. Matching is case-insensitive substring
    /// containment; the first rule with any matching keyword wins.
    pub fn infer_kind(&self, description: &str) -> Option<&str> {
        let lowered = description.to_lowercase();

        for rule in &self.keywords {
            if rule
                .keywords
                .iter()
                .any(|keyword| lowered.contains(keyword.to_lowercase().as_str()))
            {
                return Some(&rule.kind);
            }
        }

        None
    }

    pub fn direct(&self, kind: &str) -> Option<&DirectMapping> {
        self.direct.get(kind)
    }

    /// Parse a route table from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Load a route table from a YAML file.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Ok(Self::from_yaml(&content)?)
    }
}
