//! Core domain types
//!
//! These types represent the entities the engine observes and sequences.
//! Jobs are persisted by the Job Store and mutated by the Job Executor;
//! step states and runs are read-only projections on the engine side.

pub mod job;
pub mod pipeline;
pub mod run;

/// Identifier of a job, assigned by the Job Store
pub type JobId = uuid::Uuid;

/// Identifier of the run/project that owns a set of jobs
pub type OwnerId = uuid::Uuid;
