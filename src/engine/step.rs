// ABOUTME: Step definition structures and the workflow authoring format
// ABOUTME: Defines per-step dependencies, parallel groups, data contracts, and YAML parsing

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use super::error::{EngineError, Result};

/// One unit of work within a workflow.
///
/// `name` is the dependency-reference key in the authoring format; once a
/// workflow is created the engine resolves names to immutable positional
/// step ids and the name becomes presentational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    pub name: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub parallel_group: Option<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub continue_on_error: bool,
    #[serde(with = "humantime_serde", default)]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl StepDefinition {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            description: String::new(),
            depends_on: Vec::new(),
            parallel_group: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            continue_on_error: false,
            timeout: None,
            params: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_dependencies<S: Into<String>>(mut self, deps: Vec<S>) -> Self {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parallel_group(mut self, group: impl Into<String>) -> Self {
        self.parallel_group = Some(group.into());
        self
    }

    pub fn with_inputs<S: Into<String>>(mut self, inputs: Vec<S>) -> Self {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_outputs<S: Into<String>>(mut self, outputs: Vec<S>) -> Self {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_continue_on_error(mut self) -> Self {
        self.continue_on_error = true;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

/// The authoring format: a named, ordered list of steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub steps: Vec<StepDefinition>,
}

impl WorkflowSpec {
    pub fn new(name: impl Into<String>, steps: Vec<StepDefinition>) -> Self {
        Self {
            name: name.into(),
            description: None,
            steps,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parse a workflow spec from a YAML string and check its structure.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let spec: WorkflowSpec = serde_yaml::from_str(content)?;
        spec.validate_structure()?;
        Ok(spec)
    }

    /// Load a workflow spec from a YAML file.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_yaml(&content)
    }

    /// Structural checks that need no graph: name present, steps present,
    /// step names unique.
    pub fn validate_structure(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EngineError::MissingName);
        }

        if self.steps.is_empty() {
            return Err(EngineError::EmptyWorkflow);
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.name.as_str()) {
                return Err(EngineError::DuplicateStep {
                    name: step.name.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_spec() {
        let yaml = r#"
name: launch_brief
description: Prepare a launch brief

steps:
  - name: outline
    type: structure
    description: Draft the outline
    outputs: [outline_doc]

  - name: copy
    type: copy
    depends_on: [outline]
    inputs: [outline_doc]
    timeout: 30s
"#;

        let spec = WorkflowSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.name, "launch_brief");
        assert_eq!(spec.steps.len(), 2);
        assert_eq!(spec.steps[1].depends_on, vec!["outline"]);
        assert_eq!(spec.steps[1].timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_empty_name_rejected() {
        let yaml = r#"
name: ""
steps:
  - name: only
    type: structure
"#;
        assert!(matches!(
            WorkflowSpec::from_yaml(yaml),
            Err(EngineError::MissingName)
        ));
    }

    #[test]
    fn test_no_steps_rejected() {
        let yaml = r#"
name: empty
steps: []
"#;
        assert!(matches!(
            WorkflowSpec::from_yaml(yaml),
            Err(EngineError::EmptyWorkflow)
        ));
    }

    #[test]
    fn test_duplicate_step_names_rejected() {
        let spec = WorkflowSpec::new(
            "dup",
            vec![
                StepDefinition::new("a", "structure"),
                StepDefinition::new("a", "copy"),
            ],
        );

        assert!(matches!(
            spec.validate_structure(),
            Err(EngineError::DuplicateStep { name }) if name == "a"
        ));
    }

    #[test]
    fn test_step_builder() {
        let step = StepDefinition::new("review", "quality")
            .with_description("Review the draft")
            .with_dependencies(vec!["draft"])
            .with_parallel_group("reviews")
            .with_inputs(vec!["draft_doc"])
            .with_outputs(vec!["review_notes"])
            .with_continue_on_error();

        assert_eq!(step.depends_on, vec!["draft"]);
        assert_eq!(step.parallel_group.as_deref(), Some("reviews"));
        assert!(step.continue_on_error);
    }
}
