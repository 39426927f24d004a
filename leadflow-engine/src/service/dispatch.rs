//! Create-then-dispatch, shared by every orchestrator

use leadflow_core::domain::OwnerId;
use leadflow_core::domain::job::{Job, JobType};
use leadflow_core::dto::job::CreateJob;
use serde_json::Value as JsonValue;
use tracing::{error, info};

use crate::error::PipelineError;
use crate::repository::{JobExecutor, JobStore};

/// Creates a job row and hands it to the executor
///
/// Returns once the executor has accepted the job. Whether the work
/// succeeds is only learned by polling.
pub(crate) async fn create_and_dispatch(
    store: &dyn JobStore,
    executor: &dyn JobExecutor,
    owner_id: OwnerId,
    job_type: JobType,
    config: Option<JsonValue>,
) -> Result<Job, PipelineError> {
    let job = store
        .create_job(CreateJob::new(owner_id, job_type).with_config(config))
        .await
        .map_err(|e| {
            error!("Failed to create {} job for {}: {:#}", job_type, owner_id, e);
            PipelineError::CreateJob(format!("{:#}", e))
        })?;

    info!("Created {} job {} for owner {}", job_type, job.id, owner_id);

    executor.invoke(job.id).await.map_err(|e| {
        error!("Dispatch of job {} failed: {:#}", job.id, e);
        PipelineError::Dispatch(format!("{:#}", e))
    })?;

    Ok(job)
}
