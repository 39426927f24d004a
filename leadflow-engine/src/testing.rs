//! Test doubles for the collaborator traits

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use leadflow_core::domain::job::{Job, JobStatus, JobType};
use leadflow_core::domain::{JobId, OwnerId};
use leadflow_core::dto::job::{CreateJob, UpdateJob};
use uuid::Uuid;

use crate::repository::{InMemoryJobStore, JobExecutor, JobStore};

/// A job creation as seen by the store
#[derive(Debug, Clone)]
pub(crate) struct Creation {
    pub job_type: JobType,
    /// `list_jobs` calls made before this creation
    pub list_calls_before: usize,
    /// Owner's jobs at the moment of creation
    pub existing: Vec<(JobType, JobStatus)>,
}

/// Wraps the in-memory store to count calls and inject failures
pub(crate) struct ScriptedStore {
    inner: Arc<InMemoryJobStore>,
    list_calls: AtomicUsize,
    failing_lists: AtomicU32,
    failing_creates: Mutex<HashSet<JobType>>,
    creations: Mutex<Vec<Creation>>,
}

impl ScriptedStore {
    pub fn new(inner: Arc<InMemoryJobStore>) -> Self {
        Self {
            inner,
            list_calls: AtomicUsize::new(0),
            failing_lists: AtomicU32::new(0),
            failing_creates: Mutex::new(HashSet::new()),
            creations: Mutex::new(Vec::new()),
        }
    }

    /// Makes the next `count` list queries fail
    pub fn fail_next_lists(&self, count: u32) {
        self.failing_lists.store(count, Ordering::SeqCst);
    }

    /// Makes every creation of `job_type` fail; failed creations are not recorded
    pub fn fail_creates_of(&self, job_type: JobType) {
        self.failing_creates.lock().unwrap().insert(job_type);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn creations(&self) -> Vec<Creation> {
        self.creations.lock().unwrap().clone()
    }

    pub fn created_types(&self) -> Vec<JobType> {
        self.creations().into_iter().map(|c| c.job_type).collect()
    }
}

#[async_trait]
impl JobStore for ScriptedStore {
    async fn create_job(&self, req: CreateJob) -> Result<Job> {
        if self.failing_creates.lock().unwrap().contains(&req.job_type) {
            anyhow::bail!("insert into jobs failed: service unavailable");
        }

        let existing = self
            .inner
            .list_jobs(req.owner_id)
            .await?
            .into_iter()
            .map(|job| (job.job_type, job.status))
            .collect();

        self.creations.lock().unwrap().push(Creation {
            job_type: req.job_type,
            list_calls_before: self.list_calls(),
            existing,
        });

        self.inner.create_job(req).await
    }

    async fn list_jobs(&self, owner_id: OwnerId) -> Result<Vec<Job>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failing_lists
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            anyhow::bail!("connection reset by peer");
        }

        self.inner.list_jobs(owner_id).await
    }

    async fn update_job(&self, job_id: JobId, req: UpdateJob) -> Result<Job> {
        self.inner.update_job(job_id, req).await
    }
}

/// Accepts every job and never works on it
#[derive(Default)]
pub(crate) struct IdleExecutor {
    invoked: Mutex<Vec<JobId>>,
}

impl IdleExecutor {
    pub fn invoked(&self) -> Vec<JobId> {
        self.invoked.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobExecutor for IdleExecutor {
    async fn invoke(&self, job_id: JobId) -> Result<()> {
        self.invoked.lock().unwrap().push(job_id);
        Ok(())
    }
}

/// Inserts a job with the given status, created one hour ago
pub(crate) async fn seed_job(
    store: &InMemoryJobStore,
    owner_id: OwnerId,
    job_type: JobType,
    status: JobStatus,
) -> Job {
    let job = Job {
        id: Uuid::new_v4(),
        owner_id,
        job_type,
        status,
        progress: if status == JobStatus::Completed { 100 } else { 0 },
        result_summary: None,
        config: None,
        created_at: chrono::Utc::now() - chrono::Duration::hours(1),
        completed_at: None,
    };
    store.insert(job.clone()).await;
    job
}
