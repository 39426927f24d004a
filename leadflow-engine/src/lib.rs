//! Leadflow Engine
//!
//! Client-side orchestration of long-running, externally executed jobs.
//!
//! Architecture:
//! - Repositories: Collaborator traits for the Job Store and the Job Executor,
//!   with HTTP, in-memory and simulated implementations
//! - Scheduler: The job poller and the handle that owns a running poll loop
//! - Services: The multi-step pipeline orchestrator, the single-step
//!   orchestrators and the resume resolver
//!
//! Every step follows the same protocol: create a job row, dispatch it to the
//! executor, then observe the store until the job reaches a terminal status.
//! Dispatch and observation are independent operations joined only by the
//! job id.

pub mod config;
pub mod error;
pub mod repository;
pub mod scheduler;
pub mod service;

#[cfg(test)]
mod testing;

pub use config::PollerConfig;
pub use error::{ErrorKind, PipelineError, RunFailure};
pub use repository::{InMemoryJobStore, JobExecutor, JobStore, SimulatedExecutor};
pub use scheduler::{JobPoller, PollHandle};
pub use service::{
    Phase, PipelineOrchestrator, PipelineSnapshot, SingleStepOrchestrator, SingleStepSnapshot,
    resolve_resume_phase,
};
