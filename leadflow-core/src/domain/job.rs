//! Job domain types

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use super::{JobId, OwnerId};

/// Unit of observable, externally executed work
///
/// Created by an orchestrator, mutated only by the executor afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub owner_id: OwnerId,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub status: JobStatus,
    /// Advisory percentage, 0..=100
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub result_summary: Option<ResultSummary>,
    #[serde(default)]
    pub config: Option<JsonValue>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Job {
    /// Message to surface for a failed job
    ///
    /// Uses the executor's `error` entry when present.
    pub fn failure_message(&self) -> String {
        self.result_summary
            .as_ref()
            .and_then(ResultSummary::error)
            .map(str::to_string)
            .unwrap_or_else(|| "Job failed".to_string())
    }
}

/// Kind of work a job performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    SourceCompanies,
    Qualify,
    FindContacts,
    RefineLookalikes,
    CheckLinkedin,
}

impl JobType {
    pub const ALL: [JobType; 5] = [
        JobType::SourceCompanies,
        JobType::Qualify,
        JobType::FindContacts,
        JobType::RefineLookalikes,
        JobType::CheckLinkedin,
    ];

    /// Wire name of the job type
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::SourceCompanies => "source_companies",
            JobType::Qualify => "qualify",
            JobType::FindContacts => "find_contacts",
            JobType::RefineLookalikes => "refine_lookalikes",
            JobType::CheckLinkedin => "check_linkedin",
        }
    }

    /// Human label shown next to a step
    pub fn label(&self) -> &'static str {
        match self {
            JobType::SourceCompanies => "Sourcing companies",
            JobType::Qualify => "Qualifying companies",
            JobType::FindContacts => "Finding contacts",
            JobType::RefineLookalikes => "Refining lookalikes",
            JobType::CheckLinkedin => "Checking LinkedIn activity",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown job type `{}`", s))
    }
}

/// Job execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

/// Rejected status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid job status transition: {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: JobStatus,
    pub to: JobStatus,
}

impl JobStatus {
    /// Whether the job has reached its final state
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Applies a status change
    ///
    /// A terminal job never moves again; a retry needs a new job.
    pub fn transition(self, next: JobStatus) -> Result<JobStatus, InvalidTransition> {
        use JobStatus::*;

        match (self, next) {
            (Pending, Pending) | (Running, Running) => Ok(next),
            (Pending, Running) => Ok(next),
            (Pending | Running, Completed | Failed) => Ok(next),
            (Running, Pending) | (Completed | Failed, _) => Err(InvalidTransition {
                from: self,
                to: next,
            }),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Opaque key-value summary written by the executor on completion or failure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSummary(pub Map<String, JsonValue>);

impl ResultSummary {
    /// The `error` entry, when the executor wrote one as a string
    pub fn error(&self) -> Option<&str> {
        self.0.get("error").and_then(JsonValue::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, JsonValue>> for ResultSummary {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}
