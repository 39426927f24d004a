//! Run domain types
//!
//! A run (project) is the owner of a set of jobs. Its coarse lifecycle
//! status is maintained outside the engine and only read here.

use serde::{Deserialize, Serialize};

use super::OwnerId;

/// Coarse lifecycle status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Draft,
    Sourcing,
    Enriching,
    Complete,
}

/// Persisted view of a run, as needed to decide where to resume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: OwnerId,
    pub status: RunStatus,
    /// Whether a targeting profile/config has been saved for the run
    #[serde(default)]
    pub has_profile: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
