//! Job Executor boundary

use anyhow::{Context, Result};
use async_trait::async_trait;
use leadflow_client::StoreClient;
use leadflow_core::domain::JobId;

/// Remote worker that performs a job's work
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Hands a job to the executor
    ///
    /// Returns as soon as the executor has accepted the job. `Ok` does not
    /// imply any progress; an `Err` is a dispatch failure, distinct from the
    /// job later reaching `failed`.
    async fn invoke(&self, job_id: JobId) -> Result<()>;
}

#[async_trait]
impl JobExecutor for StoreClient {
    async fn invoke(&self, job_id: JobId) -> Result<()> {
        self.invoke_job(job_id)
            .await
            .with_context(|| format!("Executor rejected job {}", job_id))
    }
}
