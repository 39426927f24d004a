//! In-memory Job Store
//!
//! Process-local store used for simulation and tests. Behaves like the
//! hosted store: it assigns ids and timestamps, and refuses to move a job
//! out of a terminal status.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use leadflow_core::domain::job::{Job, JobStatus};
use leadflow_core::domain::{JobId, OwnerId};
use leadflow_core::dto::job::{CreateJob, UpdateJob};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::JobStore;

#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a job as-is, keeping its id and status
    ///
    /// Lets a host or a test seed jobs left over from an earlier session.
    pub async fn insert(&self, job: Job) {
        self.jobs.write().await.insert(job.id, job);
    }

    pub async fn get(&self, job_id: JobId) -> Option<Job> {
        self.jobs.read().await.get(&job_id).cloned()
    }

    /// Removes a job, as if it vanished from the hosted store
    pub async fn remove(&self, job_id: JobId) -> Option<Job> {
        self.jobs.write().await.remove(&job_id)
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create_job(&self, req: CreateJob) -> Result<Job> {
        let job = Job {
            id: Uuid::new_v4(),
            owner_id: req.owner_id,
            job_type: req.job_type,
            status: JobStatus::Pending,
            progress: 0,
            result_summary: None,
            config: req.config,
            created_at: chrono::Utc::now(),
            completed_at: None,
        };

        self.jobs.write().await.insert(job.id, job.clone());

        Ok(job)
    }

    async fn list_jobs(&self, owner_id: OwnerId) -> Result<Vec<Job>> {
        let jobs = self.jobs.read().await;

        let mut owned: Vec<Job> = jobs
            .values()
            .filter(|job| job.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by_key(|job| (job.created_at, job.id));

        Ok(owned)
    }

    async fn update_job(&self, job_id: JobId, req: UpdateJob) -> Result<Job> {
        let mut jobs = self.jobs.write().await;

        let job = jobs
            .get_mut(&job_id)
            .ok_or_else(|| anyhow::anyhow!("Job {} not found", job_id))?;

        if let Some(status) = req.status {
            job.status = job.status.transition(status)?;
            if status.is_terminal() && job.completed_at.is_none() {
                job.completed_at = Some(req.completed_at.unwrap_or_else(chrono::Utc::now));
            }
        }

        if let Some(progress) = req.progress {
            job.progress = progress.min(100);
        }

        if let Some(summary) = req.result_summary {
            job.result_summary = Some(summary);
        }

        Ok(job.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadflow_core::domain::job::JobType;

    #[tokio::test]
    async fn test_create_and_list_by_owner() {
        let store = InMemoryJobStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        let job = store
            .create_job(CreateJob::new(owner, JobType::SourceCompanies))
            .await
            .unwrap();
        store
            .create_job(CreateJob::new(other, JobType::Qualify))
            .await
            .unwrap();

        let jobs = store.list_jobs(owner).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, job.id);
        assert_eq!(jobs[0].status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn test_terminal_job_is_never_resurrected() {
        let store = InMemoryJobStore::new();
        let job = store
            .create_job(CreateJob::new(Uuid::new_v4(), JobType::Qualify))
            .await
            .unwrap();

        let done = store
            .update_job(job.id, UpdateJob::status(JobStatus::Completed))
            .await
            .unwrap();
        assert!(done.completed_at.is_some());

        let err = store
            .update_job(job.id, UpdateJob::status(JobStatus::Running))
            .await;
        assert!(err.is_err());
        assert_eq!(
            store.get(job.id).await.unwrap().status,
            JobStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_update_unknown_job_fails() {
        let store = InMemoryJobStore::new();
        let result = store
            .update_job(Uuid::new_v4(), UpdateJob::progress(10))
            .await;
        assert!(result.is_err());
    }
}
