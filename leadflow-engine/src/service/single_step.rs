//! Single-step orchestrators
//!
//! Refine-lookalikes and LinkedIn-activity checks are pipelines of length
//! one.
//! Unlike the lead pipeline they never look for earlier jobs: every run
//! creates a fresh job, dispatches it and polls it, and the job's result
//! summary is handed straight back to the caller.

use std::sync::Arc;

use leadflow_core::domain::OwnerId;
use leadflow_core::domain::job::ResultSummary;
use leadflow_core::domain::pipeline::{PipelineDefinition, StepDefinition};
use serde_json::Value as JsonValue;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::dispatch::create_and_dispatch;
use crate::config::PollerConfig;
use crate::error::{PipelineError, RunFailure};
use crate::repository::{JobExecutor, JobStore};
use crate::scheduler::{CancelSlot, JobPoller, PollHandle};

/// Observable state of a single-step run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SingleStepSnapshot {
    pub progress: u8,
    pub is_running: bool,
    pub is_complete: bool,
    pub result: Option<ResultSummary>,
    pub error: Option<RunFailure>,
}

pub struct SingleStepOrchestrator {
    store: Arc<dyn JobStore>,
    executor: Arc<dyn JobExecutor>,
    /// Holds exactly one step
    definition: PipelineDefinition,
    config: PollerConfig,
    state: watch::Sender<SingleStepSnapshot>,
    cancel: CancelSlot,
}

impl SingleStepOrchestrator {
    /// Orchestrator for a one-step pipeline
    ///
    /// # Errors
    /// Fails unless `definition` has exactly one step.
    pub fn new(
        store: Arc<dyn JobStore>,
        executor: Arc<dyn JobExecutor>,
        definition: PipelineDefinition,
        config: PollerConfig,
    ) -> anyhow::Result<Self> {
        if definition.len() != 1 {
            anyhow::bail!(
                "Pipeline '{}' has {} steps, a single-step run needs exactly one",
                definition.name,
                definition.len()
            );
        }

        Ok(Self::from_definition(store, executor, definition, config))
    }

    /// Refines lookalike companies, bounded to 10 minutes
    pub fn refine(store: Arc<dyn JobStore>, executor: Arc<dyn JobExecutor>) -> Self {
        Self::from_definition(
            store,
            executor,
            PipelineDefinition::refine(),
            PollerConfig::refine(),
        )
    }

    /// Checks LinkedIn activity of found contacts, bounded to 30 minutes
    pub fn linkedin_check(store: Arc<dyn JobStore>, executor: Arc<dyn JobExecutor>) -> Self {
        Self::from_definition(
            store,
            executor,
            PipelineDefinition::linkedin_check(),
            PollerConfig::linkedin_check(),
        )
    }

    fn from_definition(
        store: Arc<dyn JobStore>,
        executor: Arc<dyn JobExecutor>,
        definition: PipelineDefinition,
        config: PollerConfig,
    ) -> Self {
        let (state, _) = watch::channel(SingleStepSnapshot::default());

        Self {
            store,
            executor,
            definition,
            config,
            state,
            cancel: CancelSlot::default(),
        }
    }

    pub fn with_config(mut self, config: PollerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn definition(&self) -> &PipelineDefinition {
        &self.definition
    }

    pub fn step(&self) -> &StepDefinition {
        &self.definition.steps[0]
    }

    pub fn subscribe(&self) -> watch::Receiver<SingleStepSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SingleStepSnapshot {
        self.state.borrow().clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Spawns a run and returns the handle that owns it
    pub fn start(
        self: &Arc<Self>,
        owner_id: OwnerId,
        config: Option<JsonValue>,
    ) -> PollHandle<ResultSummary> {
        let cancel = self.cancel.renew();
        let this = Arc::clone(self);
        let token = cancel.clone();

        PollHandle::spawn(cancel, async move {
            this.execute(owner_id, config, token).await
        })
    }

    /// Runs the step on the current task and returns its result summary
    pub async fn run(
        &self,
        owner_id: OwnerId,
        config: Option<JsonValue>,
    ) -> Result<ResultSummary, PipelineError> {
        let cancel = self.cancel.renew();
        self.execute(owner_id, config, cancel).await
    }

    async fn execute(
        &self,
        owner_id: OwnerId,
        config: Option<JsonValue>,
        cancel: CancellationToken,
    ) -> Result<ResultSummary, PipelineError> {
        self.state.send_modify(|state| {
            *state = SingleStepSnapshot {
                is_running: true,
                ..Default::default()
            };
        });

        if cancel.is_cancelled() {
            return self.fail(PipelineError::Aborted);
        }

        info!("Starting '{}' for owner {}", self.step().label, owner_id);

        let job = match create_and_dispatch(
            self.store.as_ref(),
            self.executor.as_ref(),
            owner_id,
            self.step().job_type,
            config,
        )
        .await
        {
            Ok(job) => job,
            Err(e) => return self.fail(e),
        };

        let poller = JobPoller::new(Arc::clone(&self.store), self.config, cancel);
        let outcome = poller
            .wait_for_completion(owner_id, job.id, |job| {
                let progress = job.progress;
                self.state.send_modify(|state| state.progress = progress);
            })
            .await;

        match outcome {
            Ok(job) => {
                let result = job.result_summary.unwrap_or_default();
                info!("'{}' completed for owner {}", self.step().label, owner_id);
                self.state.send_modify(|state| {
                    state.progress = 100;
                    state.is_running = false;
                    state.is_complete = true;
                    state.result = Some(result.clone());
                });
                Ok(result)
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&self, error: PipelineError) -> Result<ResultSummary, PipelineError> {
        if error.is_aborted() {
            info!("'{}' aborted", self.step().label);
        } else {
            error!("'{}' failed: {}", self.step().label, error);
        }

        let failure = RunFailure::new(Some(self.step().job_type), &error);
        self.state.send_modify(|state| {
            state.is_running = false;
            state.error = Some(failure);
        });

        Err(error)
    }
}
