//! Job Store and Job Executor endpoints

use leadflow_core::domain::job::Job;
use leadflow_core::domain::{JobId, OwnerId};
use leadflow_core::dto::job::{CreateJob, InvokeJob, UpdateJob};

use crate::StoreClient;
use crate::error::{ClientError, Result};

impl StoreClient {
    // =============================================================================
    // Job Store
    // =============================================================================

    /// Create a job row
    ///
    /// The store assigns the id and starts the job as `pending`.
    pub async fn create_job(&self, req: CreateJob) -> Result<Job> {
        let url = format!("{}/jobs", self.store_url);
        let response = self
            .authorize(self.client.post(&url))
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List every job belonging to an owner
    pub async fn list_jobs(&self, owner_id: OwnerId) -> Result<Vec<Job>> {
        let url = format!("{}/jobs", self.store_url);
        let response = self
            .authorize(self.client.get(&url))
            .query(&[("owner_id", owner_id.to_string())])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Patch a job row
    pub async fn update_job(&self, job_id: JobId, req: UpdateJob) -> Result<Job> {
        let url = format!("{}/jobs/{}", self.store_url, job_id);
        let response = self
            .authorize(self.client.patch(&url))
            .json(&req)
            .send()
            .await?;

        match self.handle_response(response).await {
            Err(e) if e.is_not_found() => Err(ClientError::NotFound(format!("job {}", job_id))),
            other => other,
        }
    }

    // =============================================================================
    // Job Executor
    // =============================================================================

    /// Ask the executor to start working on a job
    ///
    /// Success only means the executor accepted the job; progress is
    /// observed through the store.
    pub async fn invoke_job(&self, job_id: JobId) -> Result<()> {
        tracing::debug!("Invoking executor for job {}", job_id);

        let response = self
            .authorize(self.client.post(&self.executor_url))
            .json(&InvokeJob { job_id })
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
