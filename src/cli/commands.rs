// ABOUTME: Command implementations for the switchyard CLI
// ABOUTME: Handles execution of run, validate, status, and agents commands

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use super::config::Config;
use crate::engine::{WorkflowEngine, WorkflowSpec, WorkflowStatus};
use crate::executors::{ExecutorSet, ScriptedExecutor};
use crate::registry::AgentRegistry;
use crate::reporting::{DetailedGenerator, ReportGenerator, SummaryGenerator};
use crate::router::{RouteTable, TaskRouter};
use crate::store::{FileRunStore, RunStore};

/// Execute a workflow file end-to-end
pub async fn run_workflow(
    workflow_path: PathBuf,
    dry_run: bool,
    max_concurrent: Option<usize>,
    detailed: bool,
    config: &Config,
) -> Result<()> {
    info!("Starting workflow execution: {}", workflow_path.display());

    let spec = WorkflowSpec::from_file(&workflow_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load workflow: {}", e))?;
    info!("Loaded workflow: {} ({} steps)", spec.name, spec.steps.len());

    let engine = build_engine(config, max_concurrent).await?;

    if dry_run {
        engine
            .validate(&spec)
            .map_err(|e| anyhow::anyhow!("Workflow validation failed: {}", e))?;
        println!("✓ Workflow '{}' is valid (dry run, nothing executed)", spec.name);
        return Ok(());
    }

    let workflow = engine
        .create_workflow(spec)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create workflow: {}", e))?;

    let finished = engine
        .run(workflow)
        .await
        .map_err(|e| anyhow::anyhow!("Workflow execution failed: {}", e))?;

    let report = if detailed {
        DetailedGenerator::new().generate(&finished)
    } else {
        SummaryGenerator::new().generate(&finished)
    };
    println!("{}", report);

    // Return an error for a failed run so the process exit code reflects it
    match finished.status {
        WorkflowStatus::Completed => Ok(()),
        status => Err(anyhow::anyhow!(
            "Workflow '{}' finished with status: {}",
            finished.name,
            status
        )),
    }
}

/// Validate a workflow file without executing it
pub async fn validate_workflow(workflow_path: PathBuf, config: &Config) -> Result<()> {
    info!("Validating workflow: {}", workflow_path.display());

    let spec = WorkflowSpec::from_file(&workflow_path)
        .await
        .map_err(|e| anyhow::anyhow!("Workflow validation failed: {}", e))?;

    let engine = build_engine(config, None).await?;
    engine
        .validate(&spec)
        .map_err(|e| anyhow::anyhow!("Workflow validation failed: {}", e))?;

    println!("✓ Workflow '{}' is valid", spec.name);
    println!("  Steps: {}", spec.steps.len());

    Ok(())
}

/// Show the recorded status of a persisted workflow run
pub async fn show_status(id: &str, detailed: bool, config: &Config) -> Result<()> {
    let store = FileRunStore::new(&config.state_path);

    let workflow = store
        .load(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No workflow '{}' in {}", id, config.state_path.display()))?;

    let report = if detailed {
        DetailedGenerator::new().generate(&workflow)
    } else {
        SummaryGenerator::new().generate(&workflow)
    };
    println!("{}", report);

    Ok(())
}

/// List the executors in the agent catalog
pub async fn list_agents(config: &Config) -> Result<()> {
    let registry = AgentRegistry::load(&config.registry_path).await?;
    let catalog = registry.snapshot();

    if catalog.is_empty() {
        println!(
            "No executors registered yet ({})",
            config.registry_path.display()
        );
        return Ok(());
    }

    println!("{:<24} {:<10} {:<20} DESCRIPTION", "NAME", "CATEGORY", "STATUS");
    for record in catalog.iter() {
        println!(
            "{:<24} {:<10} {:<20} {}",
            record.name, record.category, record.status, record.description
        );
    }

    Ok(())
}

/// Assemble an engine from configuration: catalog, route table, run log,
/// and a scripted stand-in implementation per routable executor.
async fn build_engine(config: &Config, max_concurrent: Option<usize>) -> Result<WorkflowEngine> {
    let registry = Arc::new(AgentRegistry::load(&config.registry_path).await?);

    let table = match &config.routes_path {
        Some(path) if path.exists() => RouteTable::from_file(path).await?,
        Some(path) => {
            warn!(
                "Route table {} not found, continuing with fuzzy matching only",
                path.display()
            );
            RouteTable::default()
        }
        None => RouteTable::default(),
    };

    // The real content agents are external; bind a scripted stand-in per
    // routable record so workflow files execute end-to-end.
    let mut executors = ExecutorSet::new();
    for record in registry.snapshot().routable() {
        executors.bind(Arc::new(ScriptedExecutor::new(&record.name)));
    }

    let router = TaskRouter::new(registry, table);
    let store = Arc::new(FileRunStore::new(&config.state_path));

    let max_concurrent = max_concurrent.unwrap_or(config.max_concurrent_steps);
    Ok(WorkflowEngine::new(router, executors, store).with_max_concurrent(max_concurrent))
}
