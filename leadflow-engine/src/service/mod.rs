//! Service layer
//!
//! Orchestrators sequence jobs on top of the repository and scheduler
//! layers; the resume resolver picks the phase a host re-enters on.

mod dispatch;
mod pipeline;
mod resume;
mod single_step;

pub use pipeline::{PipelineOrchestrator, PipelineSnapshot};
pub use resume::{Phase, phase_for_run, resolve_resume_phase};
pub use single_step::{SingleStepOrchestrator, SingleStepSnapshot};
