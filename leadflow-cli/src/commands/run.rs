//! Orchestration command handlers
//!
//! Starts an orchestrator, streams its snapshots to the terminal and
//! cancels it on Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::*;
use leadflow_engine::{
    PipelineError, PipelineOrchestrator, PollHandle, PollerConfig, SingleStepOrchestrator,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::backend::{Backend, SimulationArgs};
use crate::config::Config;
use crate::render;

/// Run the lead pipeline for an owner
pub async fn run_pipeline(config: &Config, owner: Uuid, simulation: &SimulationArgs) -> Result<()> {
    let backend = Backend::from_args(config, simulation);
    let orchestrator = Arc::new(
        PipelineOrchestrator::new(backend.store, backend.executor)
            .with_config(config.poller(PollerConfig::pipeline()))
            .with_completion_hook(|owner| {
                tracing::info!("Pipeline output for {} is ready; refresh dependent views", owner)
            }),
    );

    println!(
        "{}",
        format!(
            "Running {} for {}",
            orchestrator.definition().name,
            owner.to_string().cyan()
        )
        .bold()
    );

    let printer = tokio::spawn(render::pipeline_progress(orchestrator.subscribe()));
    let outcome = supervise(orchestrator.start(owner)).await;
    printer.abort();

    render::pipeline_summary(&orchestrator.snapshot());

    outcome.map(|_| ()).map_err(Into::into)
}

/// Refine lookalikes for an owner
pub async fn run_refine(
    config: &Config,
    owner: Uuid,
    job_config: Option<&str>,
    simulation: &SimulationArgs,
) -> Result<()> {
    let backend = Backend::from_args(config, simulation);
    let orchestrator = SingleStepOrchestrator::refine(backend.store, backend.executor)
        .with_config(config.poller(PollerConfig::refine()));

    run_single_step(orchestrator, owner, job_config).await
}

/// Check LinkedIn activity for an owner
pub async fn run_linkedin_check(
    config: &Config,
    owner: Uuid,
    job_config: Option<&str>,
    simulation: &SimulationArgs,
) -> Result<()> {
    let backend = Backend::from_args(config, simulation);
    let orchestrator = SingleStepOrchestrator::linkedin_check(backend.store, backend.executor)
        .with_config(config.poller(PollerConfig::linkedin_check()));

    run_single_step(orchestrator, owner, job_config).await
}

async fn run_single_step(
    orchestrator: SingleStepOrchestrator,
    owner: Uuid,
    job_config: Option<&str>,
) -> Result<()> {
    let job_config = parse_job_config(job_config)?;
    let orchestrator = Arc::new(orchestrator);

    println!(
        "{}",
        format!(
            "{} for {}",
            orchestrator.step().label,
            owner.to_string().cyan()
        )
        .bold()
    );

    let printer = tokio::spawn(render::single_step_progress(orchestrator.subscribe()));
    let outcome = supervise(orchestrator.start(owner, job_config)).await;
    printer.abort();

    match outcome {
        Ok(result) => {
            render::result_summary(&result);
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e.to_string().red());
            Err(e.into())
        }
    }
}

/// Awaits a run, cancelling it on Ctrl-C
///
/// After a Ctrl-C the run is still joined, so the orchestrator's snapshot
/// records the abort before it is rendered.
async fn supervise<T: Send + 'static>(handle: PollHandle<T>) -> Result<T, PipelineError> {
    let cancel = handle.cancellation_token();
    let run = handle.join();
    tokio::pin!(run);

    tokio::select! {
        outcome = &mut run => outcome,
        _ = tokio::signal::ctrl_c() => {
            println!("{}", "Cancelling...".yellow());
            cancel.cancel();
            run.await
        }
    }
}

fn parse_job_config(raw: Option<&str>) -> Result<Option<JsonValue>> {
    raw.map(|raw| serde_json::from_str(raw).context("--config must be valid JSON"))
        .transpose()
}
