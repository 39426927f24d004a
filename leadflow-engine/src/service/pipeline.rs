//! Pipeline orchestrator
//!
//! Runs a fixed sequence of steps for one owner. For every step the
//! orchestrator either reuses a completed job, resumes watching a job that
//! is still in flight, or creates and dispatches a new one, and it only
//! moves to the next step once the current job has completed. The first
//! failure halts the run.
//!
//! State is rebuilt from the Job Store on every run, so starting again after
//! a reload, a crash or a failure never repeats finished work.

use std::sync::Arc;

use leadflow_core::domain::OwnerId;
use leadflow_core::domain::job::{Job, JobStatus, JobType};
use leadflow_core::domain::pipeline::{PipelineDefinition, StepState};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::dispatch::create_and_dispatch;
use crate::config::PollerConfig;
use crate::error::{PipelineError, RunFailure};
use crate::repository::{JobExecutor, JobStore};
use crate::scheduler::{CancelSlot, JobPoller, PollHandle};

type CompletionHook = Box<dyn Fn(OwnerId) + Send + Sync>;

/// Observable state of a pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineSnapshot {
    pub steps: Vec<StepState>,
    pub is_running: bool,
    pub is_complete: bool,
    pub error: Option<RunFailure>,
}

impl PipelineSnapshot {
    fn idle(definition: &PipelineDefinition) -> Self {
        Self {
            steps: definition.steps.iter().map(StepState::pending).collect(),
            ..Default::default()
        }
    }

    /// Step the run stopped on, if it failed
    pub fn failed_step(&self) -> Option<&StepState> {
        self.steps
            .iter()
            .find(|step| step.status == JobStatus::Failed)
    }
}

/// Drives a multi-step pipeline for one owner at a time
pub struct PipelineOrchestrator {
    store: Arc<dyn JobStore>,
    executor: Arc<dyn JobExecutor>,
    definition: PipelineDefinition,
    config: PollerConfig,
    state: watch::Sender<PipelineSnapshot>,
    cancel: CancelSlot,
    on_complete: Option<CompletionHook>,
}

impl PipelineOrchestrator {
    /// Orchestrator for the lead pipeline with the 30 minute step bound
    pub fn new(store: Arc<dyn JobStore>, executor: Arc<dyn JobExecutor>) -> Self {
        Self::with_definition(
            store,
            executor,
            PipelineDefinition::lead_pipeline(),
            PollerConfig::pipeline(),
        )
    }

    pub fn with_definition(
        store: Arc<dyn JobStore>,
        executor: Arc<dyn JobExecutor>,
        definition: PipelineDefinition,
        config: PollerConfig,
    ) -> Self {
        let (state, _) = watch::channel(PipelineSnapshot::idle(&definition));

        Self {
            store,
            executor,
            definition,
            config,
            state,
            cancel: CancelSlot::default(),
            on_complete: None,
        }
    }

    pub fn with_config(mut self, config: PollerConfig) -> Self {
        self.config = config;
        self
    }

    /// Called once with the owner after every step has completed
    ///
    /// Hosts use it to invalidate read caches that depend on the pipeline's
    /// output.
    pub fn with_completion_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(OwnerId) + Send + Sync + 'static,
    {
        self.on_complete = Some(Box::new(hook));
        self
    }

    pub fn definition(&self) -> &PipelineDefinition {
        &self.definition
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        self.state.borrow().clone()
    }

    /// Cancels the current run, if any
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Spawns a run and returns the handle that owns it
    pub fn start(self: &Arc<Self>, owner_id: OwnerId) -> PollHandle<Vec<StepState>> {
        let cancel = self.cancel.renew();
        let this = Arc::clone(self);
        let token = cancel.clone();

        PollHandle::spawn(cancel, async move { this.execute(owner_id, token).await })
    }

    /// Runs the pipeline to completion on the current task
    ///
    /// Safe to call again after a failed or interrupted run: state is
    /// re-derived from the store.
    pub async fn run(&self, owner_id: OwnerId) -> Result<Vec<StepState>, PipelineError> {
        let cancel = self.cancel.renew();
        self.execute(owner_id, cancel).await
    }

    async fn execute(
        &self,
        owner_id: OwnerId,
        cancel: CancellationToken,
    ) -> Result<Vec<StepState>, PipelineError> {
        self.state.send_modify(|state| {
            *state = PipelineSnapshot::idle(&self.definition);
            state.is_running = true;
        });

        info!(
            "Starting pipeline '{}' for owner {}",
            self.definition.name, owner_id
        );

        let existing = tokio::select! {
            biased;
            _ = cancel.cancelled() => return self.fail(None, PipelineError::Aborted),
            listed = self.store.list_jobs(owner_id) => listed,
        };

        // Availability over dedup: a failed lookup means every step starts fresh
        let existing = existing.unwrap_or_else(|e| {
            warn!(
                "Could not fetch existing jobs for {}, starting all steps fresh: {:#}",
                owner_id, e
            );
            Vec::new()
        });

        for (index, step) in self.definition.steps.iter().enumerate() {
            if cancel.is_cancelled() {
                return self.fail(Some(index), PipelineError::Aborted);
            }

            let job_id = match latest_of_type(&existing, step.job_type) {
                Some(job) if job.status == JobStatus::Completed => {
                    info!("Step '{}' already completed by job {}", step.label, job.id);
                    self.update_step(index, |state| state.complete_with(job));
                    continue;
                }
                Some(job) if !job.status.is_terminal() => {
                    info!("Resuming step '{}' on job {}", step.label, job.id);
                    let progress = job.progress;
                    self.update_step(index, |state| {
                        state.status = JobStatus::Running;
                        state.progress = progress;
                    });
                    job.id
                }
                _ => {
                    match create_and_dispatch(
                        self.store.as_ref(),
                        self.executor.as_ref(),
                        owner_id,
                        step.job_type,
                        None,
                    )
                    .await
                    {
                        Ok(job) => {
                            self.update_step(index, |state| state.status = JobStatus::Running);
                            job.id
                        }
                        Err(e) => return self.fail(Some(index), e),
                    }
                }
            };

            let poller = JobPoller::new(Arc::clone(&self.store), self.config, cancel.clone());
            let outcome = poller
                .wait_for_completion(owner_id, job_id, |job| {
                    self.update_step(index, |state| state.progress = job.progress)
                })
                .await;

            match outcome {
                Ok(job) => {
                    info!("Step '{}' completed", step.label);
                    self.update_step(index, |state| state.complete_with(&job));
                }
                Err(e) => return self.fail(Some(index), e),
            }
        }

        self.state.send_modify(|state| {
            state.is_running = false;
            state.is_complete = true;
        });

        info!(
            "Pipeline '{}' completed for owner {}",
            self.definition.name, owner_id
        );

        if let Some(hook) = &self.on_complete {
            hook(owner_id);
        }

        Ok(self.snapshot().steps)
    }

    fn update_step(&self, index: usize, apply: impl FnOnce(&mut StepState)) {
        self.state.send_modify(|state| {
            if let Some(step) = state.steps.get_mut(index) {
                apply(step);
            }
        });
    }

    fn fail(
        &self,
        index: Option<usize>,
        error: PipelineError,
    ) -> Result<Vec<StepState>, PipelineError> {
        let step = index.and_then(|i| self.definition.steps.get(i));

        if error.is_aborted() {
            info!("Pipeline '{}' aborted", self.definition.name);
        } else if let Some(step) = step {
            error!("Step '{}' failed: {}", step.label, error);
        } else {
            error!("Pipeline '{}' failed: {}", self.definition.name, error);
        }

        let failure = RunFailure::new(step.map(|s| s.job_type), &error);
        self.state.send_modify(|state| {
            if let Some(step) = index.and_then(|i| state.steps.get_mut(i)) {
                step.status = JobStatus::Failed;
            }
            state.is_running = false;
            state.error = Some(failure);
        });

        Err(error)
    }
}

/// Most recently created job of a type
///
/// Jobs created in the same instant are ordered by id, so the pick does not
/// depend on the order the store lists them in.
fn latest_of_type(jobs: &[Job], job_type: JobType) -> Option<&Job> {
    jobs.iter()
        .filter(|job| job.job_type == job_type)
        .max_by_key(|job| (job.created_at, job.id))
}
