//! Job DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::job::{JobStatus, JobType, ResultSummary};
use crate::domain::{JobId, OwnerId};

/// Request to create a job row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJob {
    pub owner_id: OwnerId,
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<JsonValue>,
}

impl CreateJob {
    pub fn new(owner_id: OwnerId, job_type: JobType) -> Self {
        Self {
            owner_id,
            job_type,
            config: None,
        }
    }

    pub fn with_config(mut self, config: Option<JsonValue>) -> Self {
        self.config = config;
        self
    }
}

/// Partial update of a job row, written by the executor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateJob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_summary: Option<ResultSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl UpdateJob {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn progress(progress: u8) -> Self {
        Self {
            progress: Some(progress.min(100)),
            ..Default::default()
        }
    }

    pub fn with_result(mut self, summary: ResultSummary) -> Self {
        self.result_summary = Some(summary);
        self
    }
}

/// Body sent to the executor to begin work on a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeJob {
    pub job_id: JobId,
}
