//! Resume resolver
//!
//! Picks the phase a host shows when a user (re)enters, from persisted run
//! state only. Nothing is polled or dispatched here; the chosen phase
//! decides which orchestrator, if any, the host drives next.

use leadflow_core::domain::OwnerId;
use leadflow_core::domain::run::{RunStatus, RunSummary};
use serde::{Deserialize, Serialize};

/// Phase to resume into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// Initial wizard, for a fresh start or a draft without a profile
    Wizard { run_id: Option<OwnerId> },
    /// Interactive configuration of an existing run
    Configure {
        run_id: OwnerId,
        /// The run is sourcing, so its pipeline may still have live jobs
        pipeline_in_flight: bool,
    },
    Results { run_id: OwnerId },
}

impl Phase {
    pub fn run_id(&self) -> Option<OwnerId> {
        match self {
            Phase::Wizard { run_id } => *run_id,
            Phase::Configure { run_id, .. } | Phase::Results { run_id } => Some(*run_id),
        }
    }
}

/// Chooses the phase for a user's runs
///
/// Prefers the most recently updated run that is not complete, then the
/// most recently updated complete run, then a fresh wizard.
pub fn resolve_resume_phase(runs: &[RunSummary]) -> Phase {
    let open = runs
        .iter()
        .filter(|run| run.status != RunStatus::Complete)
        .max_by_key(|run| run.updated_at);

    let candidate = open.or_else(|| {
        runs.iter()
            .filter(|run| run.status == RunStatus::Complete)
            .max_by_key(|run| run.updated_at)
    });

    match candidate {
        Some(run) => phase_for_run(run),
        None => Phase::Wizard { run_id: None },
    }
}

/// Phase for a single run
pub fn phase_for_run(run: &RunSummary) -> Phase {
    let run_id = run.id;

    match (run.status, run.has_profile) {
        (RunStatus::Draft, true) => Phase::Configure {
            run_id,
            pipeline_in_flight: false,
        },
        (RunStatus::Draft, false) => Phase::Wizard {
            run_id: Some(run_id),
        },
        (RunStatus::Sourcing, _) => Phase::Configure {
            run_id,
            pipeline_in_flight: true,
        },
        // Imported runs arrive enriching without a profile
        (RunStatus::Enriching, false) => Phase::Results { run_id },
        (RunStatus::Enriching, true) => Phase::Configure {
            run_id,
            pipeline_in_flight: false,
        },
        (RunStatus::Complete, _) => Phase::Results { run_id },
    }
}
