//! Review-queue action error types.

use thiserror::Error;

use crate::api::error::ApiError;

/// Errors from operator actions on the review queue.
///
/// Eligibility failures are caught client-side before any backend call;
/// `Backend` wraps failures of calls that were actually made.
#[derive(Error, Debug)]
pub enum ActionError {
    /// The selection is empty.
    #[error("No jobs selected")]
    EmptySelection,

    /// Accept requires every selected job to be ready for review.
    #[error("Selection mixes states: {ready} ready, {not_ready} not ready for accept")]
    MixedSelection { ready: usize, not_ready: usize },

    /// Retry was requested but no selected job is in the error state.
    #[error("No failed jobs in selection to retry")]
    NothingToRetry,

    /// The job is not on the currently visible page.
    #[error("Job not on the current page: {0}")]
    NotVisible(String),

    /// Another bulk action is still in flight for this session.
    #[error("A bulk action is already in progress")]
    Busy,

    /// The backend call failed.
    #[error("Backend call failed: {0}")]
    Backend(#[from] ApiError),
}

/// Result type for queue actions.
pub type Result<T> = std::result::Result<T, ActionError>;
