//! Job poller
//!
//! Watches one job through its owner's job list until the job reaches a
//! terminal status, the attempt bound runs out, or the store keeps failing.
//! Individual query failures are tolerated up to a consecutive-error
//! threshold; everything else ends the wait.

use std::sync::Arc;

use leadflow_core::domain::job::{Job, JobStatus};
use leadflow_core::domain::{JobId, OwnerId};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::PollerConfig;
use crate::error::PipelineError;
use crate::repository::JobStore;

/// Polls the Job Store for a single job
pub struct JobPoller {
    store: Arc<dyn JobStore>,
    config: PollerConfig,
    cancel: CancellationToken,
}

impl JobPoller {
    pub fn new(store: Arc<dyn JobStore>, config: PollerConfig, cancel: CancellationToken) -> Self {
        Self {
            store,
            config,
            cancel,
        }
    }

    /// Waits until the job completes
    ///
    /// The first query runs one interval after the call. `on_progress` sees
    /// every successfully fetched snapshot of the job. A completed job is
    /// returned with its progress forced to 100.
    ///
    /// # Errors
    /// * `Aborted` - the cancellation token fired
    /// * `JobNotFound` - the job is missing from its owner's list
    /// * `JobFailed` - the job reached `failed`
    /// * `PollingErrorThresholdExceeded` - too many consecutive query failures
    /// * `Timeout` - still not terminal after `max_attempts` queries
    pub async fn wait_for_completion<F>(
        &self,
        owner_id: OwnerId,
        job_id: JobId,
        mut on_progress: F,
    ) -> Result<Job, PipelineError>
    where
        F: FnMut(&Job),
    {
        let mut ticker = time::interval_at(
            Instant::now() + self.config.interval,
            self.config.interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut attempts: u32 = 0;
        let mut consecutive_errors: u32 = 0;
        let mut last_status: Option<JobStatus> = None;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(PipelineError::Aborted),
                _ = ticker.tick() => {}
            }

            attempts += 1;
            debug!("Polling job {} (attempt {})", job_id, attempts);

            let listed = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(PipelineError::Aborted),
                listed = self.store.list_jobs(owner_id) => listed,
            };

            match listed {
                Ok(jobs) => {
                    consecutive_errors = 0;

                    let Some(mut job) = jobs.into_iter().find(|job| job.id == job_id) else {
                        warn!("Job {} no longer listed for owner {}", job_id, owner_id);
                        return Err(PipelineError::JobNotFound(job_id));
                    };

                    on_progress(&job);

                    match job.status {
                        JobStatus::Completed => {
                            job.progress = 100;
                            return Ok(job);
                        }
                        JobStatus::Failed => {
                            return Err(PipelineError::JobFailed(job.failure_message()));
                        }
                        JobStatus::Pending | JobStatus::Running => {
                            if let Some(previous) = last_status {
                                if let Err(e) = previous.transition(job.status) {
                                    warn!("Job {}: {}", job_id, e);
                                }
                            }
                            last_status = Some(job.status);
                        }
                    }
                }
                Err(e) => {
                    consecutive_errors += 1;
                    warn!(
                        "Polling job {} failed ({}/{}): {:#}",
                        job_id, consecutive_errors, self.config.error_threshold, e
                    );

                    if consecutive_errors >= self.config.error_threshold {
                        return Err(PipelineError::PollingErrorThresholdExceeded(
                            consecutive_errors,
                        ));
                    }
                }
            }

            if attempts >= self.config.max_attempts {
                warn!("Job {} timed out after {} attempts", job_id, attempts);
                return Err(PipelineError::Timeout { attempts });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryJobStore;
    use crate::testing::{ScriptedStore, seed_job};
    use leadflow_core::domain::job::JobType;
    use leadflow_core::dto::job::UpdateJob;
    use serde_json::json;
    use std::time::Duration;
    use uuid::Uuid;

    fn make_poller(store: Arc<ScriptedStore>, config: PollerConfig) -> (JobPoller, CancellationToken) {
        let cancel = CancellationToken::new();
        (JobPoller::new(store, config, cancel.clone()), cancel)
    }

    fn fast_config(max_attempts: u32) -> PollerConfig {
        PollerConfig::new(Duration::from_secs(3), max_attempts)
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_completed_job_with_full_progress() {
        let inner = Arc::new(InMemoryJobStore::new());
        let store = Arc::new(ScriptedStore::new(Arc::clone(&inner)));
        let owner = Uuid::new_v4();
        let job = seed_job(&inner, owner, JobType::Qualify, JobStatus::Running).await;

        let updater = Arc::clone(&inner);
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(4)).await;
            updater
                .update_job(job.id, UpdateJob::progress(60))
                .await
                .unwrap();
            time::sleep(Duration::from_secs(3)).await;
            updater
                .update_job(job.id, UpdateJob::status(JobStatus::Completed))
                .await
                .unwrap();
        });

        let (poller, _cancel) = make_poller(Arc::clone(&store), fast_config(600));
        let mut seen = Vec::new();
        let done = poller
            .wait_for_completion(owner, job.id, |job| seen.push(job.progress))
            .await
            .unwrap();

        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.progress, 100);
        assert_eq!(seen, vec![0, 60, 60]);
        assert_eq!(store.list_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_surfaces_executor_error() {
        let inner = Arc::new(InMemoryJobStore::new());
        let store = Arc::new(ScriptedStore::new(Arc::clone(&inner)));
        let owner = Uuid::new_v4();
        let job = seed_job(&inner, owner, JobType::FindContacts, JobStatus::Running).await;
        inner
            .update_job(
                job.id,
                UpdateJob::status(JobStatus::Failed).with_result(
                    json!({ "error": "Apollo quota exhausted" })
                        .as_object()
                        .cloned()
                        .unwrap()
                        .into(),
                ),
            )
            .await
            .unwrap();

        let (poller, _cancel) = make_poller(store, fast_config(600));
        let err = poller
            .wait_for_completion(owner, job.id, |_| {})
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PipelineError::JobFailed("Apollo quota exhausted".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_without_error_uses_generic_message() {
        let inner = Arc::new(InMemoryJobStore::new());
        let store = Arc::new(ScriptedStore::new(Arc::clone(&inner)));
        let owner = Uuid::new_v4();
        let job = seed_job(&inner, owner, JobType::Qualify, JobStatus::Failed).await;

        let (poller, _cancel) = make_poller(store, fast_config(600));
        let err = poller
            .wait_for_completion(owner, job.id, |_| {})
            .await
            .unwrap_err();

        assert_eq!(err, PipelineError::JobFailed("Job failed".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_job_is_not_retried() {
        let inner = Arc::new(InMemoryJobStore::new());
        let store = Arc::new(ScriptedStore::new(Arc::clone(&inner)));
        let missing = Uuid::new_v4();

        let (poller, _cancel) = make_poller(Arc::clone(&store), fast_config(600));
        let err = poller
            .wait_for_completion(Uuid::new_v4(), missing, |_| {})
            .await
            .unwrap_err();

        assert_eq!(err, PipelineError::JobNotFound(missing));
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_exact_budget() {
        let inner = Arc::new(InMemoryJobStore::new());
        let store = Arc::new(ScriptedStore::new(Arc::clone(&inner)));
        let owner = Uuid::new_v4();
        let job = seed_job(&inner, owner, JobType::SourceCompanies, JobStatus::Running).await;

        let config = fast_config(5);
        let (poller, _cancel) = make_poller(Arc::clone(&store), config);
        let started = Instant::now();
        let err = poller
            .wait_for_completion(owner, job.id, |_| {})
            .await
            .unwrap_err();

        assert_eq!(err, PipelineError::Timeout { attempts: 5 });
        assert_eq!(started.elapsed(), config.total_budget());
        assert_eq!(store.list_calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_errors_trip_threshold() {
        let inner = Arc::new(InMemoryJobStore::new());
        let store = Arc::new(ScriptedStore::new(Arc::clone(&inner)));
        let owner = Uuid::new_v4();
        let job = seed_job(&inner, owner, JobType::Qualify, JobStatus::Running).await;
        store.fail_next_lists(10);

        let (poller, _cancel) = make_poller(Arc::clone(&store), fast_config(600));
        let err = poller
            .wait_for_completion(owner, job.id, |_| {})
            .await
            .unwrap_err();

        assert_eq!(err, PipelineError::PollingErrorThresholdExceeded(10));
        assert_eq!(store.list_calls(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_error_counter() {
        let inner = Arc::new(InMemoryJobStore::new());
        let store = Arc::new(ScriptedStore::new(Arc::clone(&inner)));
        let owner = Uuid::new_v4();
        let job = seed_job(&inner, owner, JobType::Qualify, JobStatus::Completed).await;
        store.fail_next_lists(9);

        let (poller, _cancel) = make_poller(Arc::clone(&store), fast_config(600));
        let done = poller
            .wait_for_completion(owner, job.id, |_| {})
            .await
            .unwrap();

        assert_eq!(done.id, job.id);
        assert_eq!(store.list_calls(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interleaved_errors_never_accumulate() {
        let inner = Arc::new(InMemoryJobStore::new());
        let store = Arc::new(ScriptedStore::new(Arc::clone(&inner)));
        let owner = Uuid::new_v4();
        let job = seed_job(&inner, owner, JobType::Qualify, JobStatus::Running).await;

        let scripted = Arc::clone(&store);
        let updater = Arc::clone(&inner);
        tokio::spawn(async move {
            scripted.fail_next_lists(9);
            // 9 failures, then one good poll, then 9 more failures
            time::sleep(Duration::from_secs(31)).await;
            scripted.fail_next_lists(9);
            time::sleep(Duration::from_secs(28)).await;
            updater
                .update_job(job.id, UpdateJob::status(JobStatus::Completed))
                .await
                .unwrap();
        });

        let (poller, _cancel) = make_poller(Arc::clone(&store), fast_config(600));
        let done = poller.wait_for_completion(owner, job.id, |_| {}).await;

        assert!(done.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_queries() {
        let inner = Arc::new(InMemoryJobStore::new());
        let store = Arc::new(ScriptedStore::new(Arc::clone(&inner)));
        let owner = Uuid::new_v4();
        let job = seed_job(&inner, owner, JobType::Qualify, JobStatus::Running).await;

        let (poller, cancel) = make_poller(Arc::clone(&store), fast_config(600));
        let task =
            tokio::spawn(async move { poller.wait_for_completion(owner, job.id, |_| {}).await });

        time::sleep(Duration::from_secs(7)).await;
        cancel.cancel();

        let result = task.await.unwrap();
        assert_eq!(result.unwrap_err(), PipelineError::Aborted);
        assert_eq!(store.list_calls(), 2);

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(store.list_calls(), 2);
    }
}
