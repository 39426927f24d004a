//! Error taxonomy of the orchestration engine

use leadflow_core::domain::JobId;
use leadflow_core::domain::job::JobType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal errors surfaced by a poller or an orchestrator
///
/// Transient query failures never appear here; they are absorbed by the
/// poller until the consecutive-error threshold is reached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The executor refused to accept the job
    #[error("Failed to dispatch job: {0}")]
    Dispatch(String),

    /// The store could not create the job row
    #[error("Failed to create job: {0}")]
    CreateJob(String),

    /// The job reached the `failed` status
    #[error("{0}")]
    JobFailed(String),

    /// The job disappeared from the store
    #[error("Job {0} not found")]
    JobNotFound(JobId),

    #[error("Polling failed after {0} consecutive errors")]
    PollingErrorThresholdExceeded(u32),

    #[error("Job did not finish within {attempts} polling attempts")]
    Timeout { attempts: u32 },

    #[error("Operation aborted")]
    Aborted,
}

/// Structured kind of a [`PipelineError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Dispatch,
    CreateJob,
    JobFailed,
    JobNotFound,
    PollingErrorThresholdExceeded,
    Timeout,
    Aborted,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Dispatch(_) => ErrorKind::Dispatch,
            PipelineError::CreateJob(_) => ErrorKind::CreateJob,
            PipelineError::JobFailed(_) => ErrorKind::JobFailed,
            PipelineError::JobNotFound(_) => ErrorKind::JobNotFound,
            PipelineError::PollingErrorThresholdExceeded(_) => {
                ErrorKind::PollingErrorThresholdExceeded
            }
            PipelineError::Timeout { .. } => ErrorKind::Timeout,
            PipelineError::Aborted => ErrorKind::Aborted,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, PipelineError::Aborted)
    }
}

/// What the caller is shown when a run stops on an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    /// Step that failed, when the failure belongs to one
    pub step: Option<JobType>,
    pub kind: ErrorKind,
    pub message: String,
}

impl RunFailure {
    pub fn new(step: Option<JobType>, error: &PipelineError) -> Self {
        Self {
            step,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
