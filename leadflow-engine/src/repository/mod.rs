//! Repository layer
//!
//! Collaborator boundaries of the engine. The Job Store persists job rows;
//! the Job Executor performs a job's work and drives its status to a
//! terminal state. The engine only creates and reads rows, it never writes
//! status or progress itself.
//!
//! All collaborators are trait-based so the orchestrators can run against
//! the hosted services, an in-memory store, or test doubles.

mod executor;
mod jobs;
mod memory;
mod simulated;

// Re-export traits
pub use executor::JobExecutor;
pub use jobs::JobStore;

// Re-export implementations
pub use memory::InMemoryJobStore;
pub use simulated::SimulatedExecutor;
