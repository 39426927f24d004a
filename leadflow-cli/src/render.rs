//! Terminal rendering of jobs and orchestration snapshots

use colored::*;
use leadflow_core::domain::job::{Job, JobStatus, ResultSummary};
use leadflow_core::domain::pipeline::StepState;
use leadflow_engine::{PipelineSnapshot, SingleStepSnapshot};
use tokio::sync::watch;

/// Prints a line whenever a step changes status or progress
pub async fn pipeline_progress(mut updates: watch::Receiver<PipelineSnapshot>) {
    let mut last: Vec<(JobStatus, u8)> = Vec::new();

    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update().clone();

        for (index, step) in snapshot.steps.iter().enumerate() {
            let current = (step.status, step.progress);
            if last.get(index) != Some(&current) && step.status != JobStatus::Pending {
                print_step(index + 1, snapshot.steps.len(), step);
            }
        }

        last = snapshot
            .steps
            .iter()
            .map(|step| (step.status, step.progress))
            .collect();
    }
}

pub async fn single_step_progress(mut updates: watch::Receiver<SingleStepSnapshot>) {
    let mut last = None;

    while updates.changed().await.is_ok() {
        let progress = updates.borrow_and_update().progress;
        if last != Some(progress) {
            println!("  {} {:>3}%", "▸".cyan(), progress);
            last = Some(progress);
        }
    }
}

fn print_step(position: usize, total: usize, step: &StepState) {
    println!(
        "  [{}/{}] {:<28} {} {:>3}%",
        position,
        total,
        step.label,
        colorize_status(&step.status),
        step.progress
    );
}

/// Final state of a pipeline run
pub fn pipeline_summary(snapshot: &PipelineSnapshot) {
    println!();
    if snapshot.is_complete {
        println!("{}", "✓ Pipeline completed".green().bold());
    } else if let Some(failure) = &snapshot.error {
        let step = snapshot
            .failed_step()
            .map(|step| step.label.as_str())
            .unwrap_or("pipeline");
        println!("{} {} failed: {}", "✗".red(), step.bold(), failure.message.red());
    }

    for step in &snapshot.steps {
        println!("  {:<28} {}", step.label, colorize_status(&step.status));
    }
}

pub fn result_summary(result: &ResultSummary) {
    println!("{}", "✓ Completed".green().bold());
    if result.is_empty() {
        return;
    }

    println!("\n{}", "Result:".bold());
    for (key, value) in &result.0 {
        println!("  {} = {}", key.cyan(), value);
    }
}

/// Print a job summary
pub fn job_summary(job: &Job) {
    println!("  {} Job {}", "▸".cyan(), job.id.to_string().dimmed());
    println!("    Type:     {}", job.job_type);
    println!(
        "    Status:   {} ({}%)",
        colorize_status(&job.status),
        job.progress
    );
    println!(
        "    Created:  {}",
        job.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    if let Some(completed) = job.completed_at {
        println!(
            "    Finished: {}",
            completed.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }
    if job.status == JobStatus::Failed {
        println!("    Error:    {}", job.failure_message().red());
    }
    println!();
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
    }
}
