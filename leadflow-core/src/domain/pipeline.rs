//! Pipeline domain types
//!
//! A pipeline is a fixed, ordered sequence of steps. Each step is backed by
//! at most one live job at a time; its in-memory state mirrors that job.

use serde::{Deserialize, Serialize};

use super::job::{Job, JobStatus, JobType, ResultSummary};

/// One position in a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub job_type: JobType,
    pub label: String,
}

impl StepDefinition {
    pub fn new(job_type: JobType) -> Self {
        Self {
            job_type,
            label: job_type.label().to_string(),
        }
    }
}

/// Ordered step sequence for one pipeline kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub name: String,
    pub steps: Vec<StepDefinition>,
}

impl PipelineDefinition {
    /// Source companies, qualify them, then find contacts
    pub fn lead_pipeline() -> Self {
        Self {
            name: "lead-pipeline".to_string(),
            steps: vec![
                StepDefinition::new(JobType::SourceCompanies),
                StepDefinition::new(JobType::Qualify),
                StepDefinition::new(JobType::FindContacts),
            ],
        }
    }

    pub fn refine() -> Self {
        Self::single("refine", JobType::RefineLookalikes)
    }

    pub fn linkedin_check() -> Self {
        Self::single("linkedin-check", JobType::CheckLinkedin)
    }

    fn single(name: &str, job_type: JobType) -> Self {
        Self {
            name: name.to_string(),
            steps: vec![StepDefinition::new(job_type)],
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// In-memory projection of a step's job plus display metadata
///
/// Never persisted; rebuilt from the Job Store on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepState {
    pub step: JobType,
    pub label: String,
    pub status: JobStatus,
    pub progress: u8,
    pub result_summary: Option<ResultSummary>,
}

impl StepState {
    /// State of a step before any job backs it
    pub fn pending(definition: &StepDefinition) -> Self {
        Self {
            step: definition.job_type,
            label: definition.label.clone(),
            status: JobStatus::Pending,
            progress: 0,
            result_summary: None,
        }
    }

    /// Mirrors a completed job onto the step
    pub fn complete_with(&mut self, job: &Job) {
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.result_summary = job.result_summary.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_pipeline_order() {
        let def = PipelineDefinition::lead_pipeline();
        let order: Vec<_> = def.steps.iter().map(|s| s.job_type).collect();
        assert_eq!(
            order,
            vec![
                JobType::SourceCompanies,
                JobType::Qualify,
                JobType::FindContacts
            ]
        );
    }

    #[test]
    fn test_single_step_pipelines() {
        assert_eq!(PipelineDefinition::refine().len(), 1);
        assert!(!PipelineDefinition::refine().is_empty());
        assert_eq!(
            PipelineDefinition::linkedin_check().steps[0].job_type,
            JobType::CheckLinkedin
        );
    }

    #[test]
    fn test_pending_step_state() {
        let state = StepState::pending(&StepDefinition::new(JobType::Qualify));
        assert_eq!(state.status, JobStatus::Pending);
        assert_eq!(state.progress, 0);
        assert_eq!(state.label, "Qualifying companies");
    }
}
