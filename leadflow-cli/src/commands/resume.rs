//! Resume phase command

use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use leadflow_core::domain::run::RunSummary;
use leadflow_engine::{Phase, resolve_resume_phase};

/// Print the phase a user with these runs resumes into
pub fn resolve(path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let runs: Vec<RunSummary> =
        serde_json::from_str(&raw).context("Runs file must be a JSON array of runs")?;

    let phase = resolve_resume_phase(&runs);

    let description = match phase {
        Phase::Wizard { run_id: None } => "Start a new run in the wizard".to_string(),
        Phase::Wizard {
            run_id: Some(run_id),
        } => format!("Continue the wizard for draft {}", run_id),
        Phase::Configure {
            run_id,
            pipeline_in_flight: true,
        } => format!("Configure run {} (pipeline still running)", run_id),
        Phase::Configure { run_id, .. } => format!("Configure run {}", run_id),
        Phase::Results { run_id } => format!("Show results of run {}", run_id),
    };

    println!("{} {}", "▸".cyan(), description.bold());
    println!("{}", serde_json::to_string_pretty(&phase)?.dimmed());

    Ok(())
}
