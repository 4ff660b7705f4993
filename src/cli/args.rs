// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for switchyard

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "switchyard")]
#[command(about = "Task routing and workflow orchestration over a durable executor catalog")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a workflow from a YAML file
    Run {
        #[arg(help = "Path to workflow YAML file")]
        workflow: PathBuf,

        #[arg(long, help = "Dry run - validate without executing")]
        dry_run: bool,

        #[arg(long, help = "Maximum number of concurrent steps")]
        max_concurrent: Option<usize>,

        #[arg(long, help = "Print the detailed report instead of the summary")]
        detailed: bool,
    },

    /// Validate a workflow file without executing
    Validate {
        #[arg(help = "Path to workflow YAML file")]
        workflow: PathBuf,
    },

    /// Show the recorded status of a workflow run
    Status {
        #[arg(help = "Workflow id from the run log")]
        id: String,

        #[arg(long, help = "Print the detailed report instead of the summary")]
        detailed: bool,
    },

    /// List the executors in the agent catalog
    Agents {},
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_parses() {
        let args =
            Args::try_parse_from(["switchyard", "run", "flow.yaml", "--max-concurrent", "8"])
                .unwrap();

        match args.command {
            Commands::Run {
                workflow,
                max_concurrent,
                dry_run,
                ..
            } => {
                assert_eq!(workflow, PathBuf::from("flow.yaml"));
                assert_eq!(max_concurrent, Some(8));
                assert!(!dry_run);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_status_command_parses() {
        let args = Args::try_parse_from(["switchyard", "status", "abc-123", "--detailed"]).unwrap();

        match args.command {
            Commands::Status { id, detailed } => {
                assert_eq!(id, "abc-123");
                assert!(detailed);
            }
            _ => panic!("expected status command"),
        }
    }
}
