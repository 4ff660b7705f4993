// ABOUTME: Reporting module rendering workflow runs for humans
// ABOUTME: Exposes summary and detailed generators over recorded workflow state

pub mod generator;

pub use generator::{DetailedGenerator, ReportGenerator, SummaryGenerator};

use std::collections::HashMap;

use crate::engine::WorkflowInstance;

/// Registry of report generators, keyed by report type.
pub struct ReportingEngine {
    generators: HashMap<String, Box<dyn ReportGenerator>>,
}

impl ReportingEngine {
    pub fn new() -> Self {
        let mut engine = Self {
            generators: HashMap::new(),
        };

        engine.register(Box::new(SummaryGenerator::new()));
        engine.register(Box::new(DetailedGenerator::new()));

        engine
    }

    pub fn register(&mut self, generator: Box<dyn ReportGenerator>) {
        self.generators
            .insert(generator.report_type().to_string(), generator);
    }

    pub fn generate(&self, report_type: &str, workflow: &WorkflowInstance) -> Option<String> {
        self.generators
            .get(report_type)
            .map(|g| g.generate(workflow))
    }

    pub fn list_generators(&self) -> Vec<&str> {
        self.generators.keys().map(|k| k.as_str()).collect()
    }
}

impl Default for ReportingEngine {
    fn default() -> Self {
        Self::new()
    }
}
