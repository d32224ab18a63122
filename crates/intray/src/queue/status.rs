//! Unified review state derivation.

use serde::{Deserialize, Serialize};

use crate::api::types::{IngestionJob, RawStatus, VectorSyncStatus};

/// The unified state an operator reviews against.
///
/// Derived from the raw pipeline status on every read, never stored: the
/// vector-sync signals on the same record can change independently between
/// polls, and a cached value would go stale without the record changing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    Pending,
    Processing,
    Ready,
    Error,
}

impl ReviewState {
    /// Maps raw pipeline state and vector-sync signals to a review state.
    ///
    /// Total over all inputs: unrecognized server statuses map to
    /// `Pending` rather than failing, so a newer server enum never crashes
    /// the client. The vector-sync arguments do not change the mapped
    /// state (they drive retry routing), but they are part of the contract
    /// so the derivation has one signature across the crate.
    pub fn derive(
        raw_status: RawStatus,
        _vector_sync_status: Option<VectorSyncStatus>,
        _steps_failed: u32,
        _chunks_failed: u32,
    ) -> Self {
        match raw_status {
            RawStatus::NeedsReview => ReviewState::Ready,
            RawStatus::Processing => ReviewState::Processing,
            RawStatus::Failed => ReviewState::Error,
            RawStatus::Pending | RawStatus::Unknown => ReviewState::Pending,
        }
    }

    /// Derives the review state for a job record.
    pub fn of(job: &IngestionJob) -> Self {
        Self::derive(
            job.raw_status,
            job.vector_sync_status,
            job.vector_steps_failed,
            job.vector_chunks_failed,
        )
    }

    /// True for states an operator can act on (accept, reject, retry).
    pub fn is_actionable(&self) -> bool {
        matches!(self, ReviewState::Ready | ReviewState::Error)
    }
}

impl std::fmt::Display for ReviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewState::Pending => write!(f, "Pending"),
            ReviewState::Processing => write!(f, "Processing"),
            ReviewState::Ready => write!(f, "Ready"),
            ReviewState::Error => write!(f, "Error"),
        }
    }
}
