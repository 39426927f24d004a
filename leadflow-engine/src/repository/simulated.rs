//! Simulated Job Executor
//!
//! Stands in for the remote executor when running against the in-memory
//! store. Each accepted job is driven by a background task that marks it
//! running, advances its progress on a fixed tick and finally writes a
//! terminal status, exactly as the remote function writes to the hosted
//! store.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use leadflow_core::domain::JobId;
use leadflow_core::domain::job::{JobStatus, JobType, ResultSummary};
use leadflow_core::dto::job::UpdateJob;
use serde_json::json;
use tokio::time;
use tracing::{debug, warn};

use super::{InMemoryJobStore, JobExecutor, JobStore};

/// Progress added on every tick
const PROGRESS_STEP: u8 = 25;

pub struct SimulatedExecutor {
    store: Arc<InMemoryJobStore>,
    tick: Duration,
    /// Job types whose jobs end as `failed`, with the error to report
    failing: HashMap<JobType, String>,
    /// Job types whose dispatch is refused outright
    rejecting: HashSet<JobType>,
    invoked: Mutex<Vec<JobId>>,
}

impl SimulatedExecutor {
    pub fn new(store: Arc<InMemoryJobStore>) -> Self {
        Self {
            store,
            tick: Duration::from_secs(2),
            failing: HashMap::new(),
            rejecting: HashSet::new(),
            invoked: Mutex::new(Vec::new()),
        }
    }

    /// Time between two progress writes
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Jobs of this type end as `failed` with the given error
    pub fn failing(mut self, job_type: JobType, message: impl Into<String>) -> Self {
        self.failing.insert(job_type, message.into());
        self
    }

    /// Dispatch of jobs of this type is refused
    pub fn rejecting(mut self, job_type: JobType) -> Self {
        self.rejecting.insert(job_type);
        self
    }

    /// Ids of every job accepted so far, in dispatch order
    pub fn invoked(&self) -> Vec<JobId> {
        self.invoked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn drive(
        store: Arc<InMemoryJobStore>,
        job_id: JobId,
        tick: Duration,
        failure: Option<String>,
    ) -> Result<()> {
        time::sleep(tick).await;
        store
            .update_job(job_id, UpdateJob::status(JobStatus::Running))
            .await?;

        let mut progress: u8 = 0;
        loop {
            time::sleep(tick).await;
            progress = progress.saturating_add(PROGRESS_STEP).min(100);

            if let Some(message) = &failure {
                let summary = ResultSummary::from(
                    json!({ "error": message })
                        .as_object()
                        .cloned()
                        .unwrap_or_default(),
                );
                store
                    .update_job(
                        job_id,
                        UpdateJob::status(JobStatus::Failed).with_result(summary),
                    )
                    .await?;
                return Ok(());
            }

            if progress >= 100 {
                let summary = ResultSummary::from(
                    json!({ "simulated": true })
                        .as_object()
                        .cloned()
                        .unwrap_or_default(),
                );
                let mut update = UpdateJob::status(JobStatus::Completed).with_result(summary);
                update.progress = Some(100);
                store.update_job(job_id, update).await?;
                return Ok(());
            }

            store
                .update_job(job_id, UpdateJob::progress(progress))
                .await?;
            debug!("Simulated job {} at {}%", job_id, progress);
        }
    }
}

#[async_trait]
impl JobExecutor for SimulatedExecutor {
    async fn invoke(&self, job_id: JobId) -> Result<()> {
        let job = self
            .store
            .get(job_id)
            .await
            .with_context(|| format!("Job {} not found", job_id))?;

        if self.rejecting.contains(&job.job_type) {
            anyhow::bail!("Executor refused {} job {}", job.job_type, job_id);
        }

        self.invoked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(job_id);

        let store = Arc::clone(&self.store);
        let tick = self.tick;
        let failure = self.failing.get(&job.job_type).cloned();

        tokio::spawn(async move {
            if let Err(e) = Self::drive(store, job_id, tick, failure).await {
                warn!("Simulated execution of job {} stopped: {:#}", job_id, e);
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadflow_core::dto::job::CreateJob;
    use uuid::Uuid;

    #[tokio::test(start_paused = true)]
    async fn test_drives_job_to_completion() {
        let store = Arc::new(InMemoryJobStore::new());
        let executor = SimulatedExecutor::new(Arc::clone(&store)).with_tick(Duration::from_secs(1));

        let job = store
            .create_job(CreateJob::new(Uuid::new_v4(), JobType::Qualify))
            .await
            .unwrap();
        executor.invoke(job.id).await.unwrap();

        time::sleep(Duration::from_secs(10)).await;

        let done = store.get(job.id).await.unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.progress, 100);
        assert_eq!(executor.invoked(), vec![job.id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_type_writes_error() {
        let store = Arc::new(InMemoryJobStore::new());
        let executor = SimulatedExecutor::new(Arc::clone(&store))
            .with_tick(Duration::from_secs(1))
            .failing(JobType::FindContacts, "provider unavailable");

        let job = store
            .create_job(CreateJob::new(Uuid::new_v4(), JobType::FindContacts))
            .await
            .unwrap();
        executor.invoke(job.id).await.unwrap();

        time::sleep(Duration::from_secs(5)).await;

        let failed = store.get(job.id).await.unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.failure_message(), "provider unavailable");
    }

    #[tokio::test(start_paused = true)]
    async fn test_poisoned_ledger_still_records_dispatch() {
        let store = Arc::new(InMemoryJobStore::new());
        let executor = Arc::new(SimulatedExecutor::new(Arc::clone(&store)));

        let poisoner = Arc::clone(&executor);
        let _ = std::thread::spawn(move || {
            let _ids = poisoner.invoked.lock().unwrap();
            panic!("ledger holder crashed");
        })
        .join();
        assert!(executor.invoked.is_poisoned());

        let job = store
            .create_job(CreateJob::new(Uuid::new_v4(), JobType::SourceCompanies))
            .await
            .unwrap();
        executor.invoke(job.id).await.unwrap();

        assert_eq!(executor.invoked(), vec![job.id]);
    }

    #[tokio::test]
    async fn test_rejecting_type_refuses_dispatch() {
        let store = Arc::new(InMemoryJobStore::new());
        let executor = SimulatedExecutor::new(Arc::clone(&store)).rejecting(JobType::Qualify);

        let job = store
            .create_job(CreateJob::new(Uuid::new_v4(), JobType::Qualify))
            .await
            .unwrap();

        assert!(executor.invoke(job.id).await.is_err());
        assert!(executor.invoked().is_empty());
    }
}
