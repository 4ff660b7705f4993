// ABOUTME: Dependency graph compilation and execution planning
// ABOUTME: Resolves name references to step ids, detects cycles, and batches independent steps

use petgraph::algo::toposort;
use petgraph::graph::NodeIndex;
use petgraph::{Direction, Graph};
use std::collections::{HashMap, HashSet};

use super::error::{EngineError, Result};
use super::step::StepDefinition;

/// Compiled dependency graph over a workflow's steps.
///
/// Dependency names are resolved exactly once, at build time, to positional
/// step ids; everything downstream is id-keyed, so step names are purely
/// presentational after this point.
pub struct StepGraph {
    graph: Graph<usize, ()>,
    nodes: Vec<NodeIndex>,
    names: Vec<String>,
}

/// Level-batched execution order: every batch only depends on steps in
/// earlier batches, so members of one batch are mutually independent.
#[derive(Debug)]
pub struct ExecutionPlan {
    pub batches: Vec<Vec<usize>>,
    pub total_steps: usize,
}

impl StepGraph {
    /// Build the graph, resolving dependency names to step indices.
    pub fn build(steps: &[StepDefinition]) -> Result<Self> {
        let mut graph = Graph::new();
        let mut nodes = Vec::with_capacity(steps.len());
        let mut by_name: HashMap<&str, usize> = HashMap::new();

        for (index, step) in steps.iter().enumerate() {
            nodes.push(graph.add_node(index));
            by_name.insert(step.name.as_str(), index);
        }

        let names: Vec<String> = steps.iter().map(|s| s.name.clone()).collect();

        for (index, step) in steps.iter().enumerate() {
            for dependency in &step.depends_on {
                match by_name.get(dependency.as_str()) {
                    Some(&dep_index) => {
                        // Edge from dependency to dependent.
                        graph.add_edge(nodes[dep_index], nodes[index], ());
                    }
                    None => {
                        return Err(EngineError::DependencyError {
                            step: step.name.clone(),
                            dependency: dependency.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            graph,
            nodes,
            names,
        })
    }

    /// Compute the batched execution plan, failing on cycles.
    pub fn execution_plan(&self) -> Result<ExecutionPlan> {
        let sorted = toposort(&self.graph, None).map_err(|cycle| {
            let step_index = self.graph[cycle.node_id()];
            EngineError::CircularDependency {
                step: self.names[step_index].clone(),
            }
        })?;

        Ok(ExecutionPlan {
            batches: self.create_batches(sorted),
            total_steps: self.nodes.len(),
        })
    }

    /// Group the sorted steps into batches whose dependencies all sit in
    /// earlier batches. Within a batch, steps keep declared order.
    fn create_batches(&self, sorted: Vec<NodeIndex>) -> Vec<Vec<usize>> {
        let mut batches = Vec::new();
        let mut placed: HashSet<NodeIndex> = HashSet::new();
        let mut remaining: Vec<NodeIndex> = sorted;

        while !remaining.is_empty() {
            let mut batch_nodes = Vec::new();
            let mut still_remaining = Vec::new();

            for node in remaining {
                let ready = self
                    .graph
                    .neighbors_directed(node, Direction::Incoming)
                    .all(|dep| placed.contains(&dep));

                if ready {
                    batch_nodes.push(node);
                } else {
                    still_remaining.push(node);
                }
            }

            if batch_nodes.is_empty() {
                // Unreachable after a successful toposort.
                break;
            }

            for node in &batch_nodes {
                placed.insert(*node);
            }

            let mut batch: Vec<usize> = batch_nodes.iter().map(|n| self.graph[*n]).collect();
            batch.sort_unstable();
            batches.push(batch);

            remaining = still_remaining;
        }

        batches
    }

    /// Step indices the given step directly depends on.
    pub fn dependencies_of(&self, step_index: usize) -> Vec<usize> {
        self.graph
            .neighbors_directed(self.nodes[step_index], Direction::Incoming)
            .map(|n| self.graph[n])
            .collect()
    }

    /// Step indices that directly depend on the given step.
    pub fn dependents_of(&self, step_index: usize) -> Vec<usize> {
        self.graph
            .neighbors_directed(self.nodes[step_index], Direction::Outgoing)
            .map(|n| self.graph[n])
            .collect()
    }
}

impl ExecutionPlan {
    pub fn max_parallelism(&self) -> usize {
        self.batches.iter().map(|b| b.len()).max().unwrap_or(0)
    }

    pub fn execution_depth(&self) -> usize {
        self.batches.len()
    }

    /// Flattened order: every step appears after all of its dependencies.
    pub fn ordered_steps(&self) -> Vec<usize> {
        self.batches.iter().flatten().copied().collect()
    }
}
