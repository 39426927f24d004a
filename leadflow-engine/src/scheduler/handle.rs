//! Poll handle
//!
//! Owns a spawned orchestration together with the cancellation token its
//! pollers watch. Exactly one owner holds the handle. Dropping it cancels
//! the run and detaches the task, which then stops at its next suspension
//! point and records the abort like an explicit cancel would.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;

/// Handle to a running orchestration
pub struct PollHandle<T> {
    cancel: CancellationToken,
    task: Option<JoinHandle<Result<T, PipelineError>>>,
}

impl<T: Send + 'static> PollHandle<T> {
    /// Spawns `run` on the runtime, tied to `cancel`
    pub fn spawn<F>(cancel: CancellationToken, run: F) -> Self
    where
        F: Future<Output = Result<T, PipelineError>> + Send + 'static,
    {
        Self {
            cancel,
            task: Some(tokio::spawn(run)),
        }
    }

    /// Requests cooperative cancellation
    ///
    /// The run stops at its next suspension point and resolves to
    /// `PipelineError::Aborted`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token observed by the run's pollers
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the run to finish and returns its outcome
    pub async fn join(mut self) -> Result<T, PipelineError> {
        let Some(task) = self.task.take() else {
            return Err(PipelineError::Aborted);
        };

        match task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(PipelineError::Aborted),
        }
    }
}

impl<T> Drop for PollHandle<T> {
    fn drop(&mut self) {
        // The task is left to finish so the orchestrator can publish the abort
        if self.task.take().is_some() {
            self.cancel.cancel();
        }
    }
}

/// Cancellation token of an orchestrator's current run
///
/// Renewing the slot cancels the previous run, so at most one run per
/// orchestrator instance is live at a time.
#[derive(Default)]
pub(crate) struct CancelSlot(Mutex<CancellationToken>);

impl CancelSlot {
    pub(crate) fn renew(&self) -> CancellationToken {
        let mut current = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        current.cancel();
        *current = CancellationToken::new();
        current.clone()
    }

    pub(crate) fn cancel(&self) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}
