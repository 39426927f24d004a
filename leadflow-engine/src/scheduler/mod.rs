//! Scheduler layer
//!
//! Observation side of the engine: the poller that watches a single job
//! until it settles, and the handle that owns a spawned orchestration and
//! its cancellation token.

pub mod handle;
pub mod poller;

pub(crate) use handle::CancelSlot;
pub use handle::PollHandle;
pub use poller::JobPoller;
