//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod jobs;
mod resume;
mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use uuid::Uuid;

use crate::backend::SimulationArgs;
use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Source, qualify and find contacts for a run
    Pipeline {
        /// Run (owner) ID
        owner: Uuid,

        #[command(flatten)]
        simulation: SimulationArgs,
    },
    /// Refine lookalike companies for a run
    Refine {
        /// Run (owner) ID
        owner: Uuid,

        /// Job configuration as JSON
        #[arg(long)]
        config: Option<String>,

        #[command(flatten)]
        simulation: SimulationArgs,
    },
    /// Check LinkedIn activity of a run's contacts
    Linkedin {
        /// Run (owner) ID
        owner: Uuid,

        /// Job configuration as JSON
        #[arg(long)]
        config: Option<String>,

        #[command(flatten)]
        simulation: SimulationArgs,
    },
    /// List the jobs of a run
    Jobs {
        /// Run (owner) ID
        owner: Uuid,
    },
    /// Resolve the phase to resume into from a JSON list of runs
    Resume {
        /// Path to a JSON array of runs
        runs: PathBuf,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Pipeline { owner, simulation } => {
            run::run_pipeline(config, owner, &simulation).await
        }
        Commands::Refine {
            owner,
            config: job_config,
            simulation,
        } => run::run_refine(config, owner, job_config.as_deref(), &simulation).await,
        Commands::Linkedin {
            owner,
            config: job_config,
            simulation,
        } => run::run_linkedin_check(config, owner, job_config.as_deref(), &simulation).await,
        Commands::Jobs { owner } => jobs::list_jobs(config, owner).await,
        Commands::Resume { runs } => resume::resolve(&runs),
    }
}
