//! Job listing command

use anyhow::{Context, Result};
use colored::*;
use uuid::Uuid;

use crate::config::Config;
use crate::render;

/// List every job of an owner from the Job Store
pub async fn list_jobs(config: &Config, owner: Uuid) -> Result<()> {
    let client = config.client();
    let mut jobs = client
        .list_jobs(owner)
        .await
        .context("Failed to list jobs")?;

    if jobs.is_empty() {
        println!("{}", format!("No jobs found for run {}.", owner).yellow());
        return Ok(());
    }

    jobs.sort_by_key(|job| job.created_at);

    println!(
        "{}",
        format!("Found {} job(s) for run {}:", jobs.len(), owner).bold()
    );
    println!();
    for job in &jobs {
        render::job_summary(job);
    }

    Ok(())
}
