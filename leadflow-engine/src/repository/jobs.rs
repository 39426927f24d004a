//! Job Store boundary

use anyhow::{Context, Result};
use async_trait::async_trait;
use leadflow_client::StoreClient;
use leadflow_core::domain::job::Job;
use leadflow_core::domain::{JobId, OwnerId};
use leadflow_core::dto::job::{CreateJob, UpdateJob};

/// Durable record of jobs
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Creates a job row
    ///
    /// The store assigns the id; new jobs start as `pending`.
    async fn create_job(&self, req: CreateJob) -> Result<Job>;

    /// Lists every job belonging to an owner
    ///
    /// Jobs are always looked up through their owner, never by id alone.
    async fn list_jobs(&self, owner_id: OwnerId) -> Result<Vec<Job>>;

    /// Applies a partial update to a job
    ///
    /// Only executors call this. Orchestrators observe its effects.
    async fn update_job(&self, job_id: JobId, req: UpdateJob) -> Result<Job>;
}

#[async_trait]
impl JobStore for StoreClient {
    async fn create_job(&self, req: CreateJob) -> Result<Job> {
        let job_type = req.job_type;
        StoreClient::create_job(self, req)
            .await
            .with_context(|| format!("Failed to create {} job", job_type))
    }

    async fn list_jobs(&self, owner_id: OwnerId) -> Result<Vec<Job>> {
        StoreClient::list_jobs(self, owner_id)
            .await
            .with_context(|| format!("Failed to list jobs for owner {}", owner_id))
    }

    async fn update_job(&self, job_id: JobId, req: UpdateJob) -> Result<Job> {
        StoreClient::update_job(self, job_id, req)
            .await
            .with_context(|| format!("Failed to update job {}", job_id))
    }
}
