//! Bulk action outcomes and eligibility rules.

use serde::Serialize;

use crate::api::types::{BulkAcceptResponse, BulkRejectResponse, BulkRetryResponse};
use crate::queue::error::ActionError;
use crate::queue::repository::ReviewJob;
use crate::queue::status::ReviewState;

/// Per-item outcome counts for a bulk action.
///
/// When an operation spans both retry subsystems the two result sets are
/// merged additively; a job is never reported in more than one bucket.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BulkActionResult {
    pub succeeded: u32,
    pub failed: u32,
    pub skipped: u32,
}

impl BulkActionResult {
    /// A result where every job failed (e.g. the whole call never reached
    /// the server).
    pub fn all_failed(count: usize) -> Self {
        Self {
            succeeded: 0,
            failed: count as u32,
            skipped: 0,
        }
    }

    /// Adds another result set into this one.
    pub fn merge(&mut self, other: BulkActionResult) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }

    /// Total jobs accounted for.
    pub fn total(&self) -> u32 {
        self.succeeded + self.failed + self.skipped
    }
}

impl From<BulkAcceptResponse> for BulkActionResult {
    fn from(r: BulkAcceptResponse) -> Self {
        Self {
            succeeded: r.accepted,
            failed: r.failed,
            skipped: 0,
        }
    }
}

impl From<BulkRejectResponse> for BulkActionResult {
    fn from(r: BulkRejectResponse) -> Self {
        Self {
            succeeded: r.rejected,
            failed: r.failed,
            skipped: 0,
        }
    }
}

impl From<BulkRetryResponse> for BulkActionResult {
    fn from(r: BulkRetryResponse) -> Self {
        Self {
            succeeded: r.retried,
            failed: r.failed,
            skipped: r.skipped,
        }
    }
}

/// Verifies that every job in the slice is ready for accept.
///
/// Accepting a document that never finished review would publish it to the
/// library unreviewed, so a mixed selection is rejected outright with no
/// backend call.
pub fn ensure_all_ready(jobs: &[ReviewJob]) -> Result<(), ActionError> {
    if jobs.is_empty() {
        return Err(ActionError::EmptySelection);
    }
    let ready = jobs
        .iter()
        .filter(|j| j.state == ReviewState::Ready)
        .count();
    if ready != jobs.len() {
        return Err(ActionError::MixedSelection {
            ready,
            not_ready: jobs.len() - ready,
        });
    }
    Ok(())
}

/// Returns the error-state members of the slice.
///
/// Ready members in a retry selection are ignored rather than rejected.
pub fn filter_error_state(jobs: &[ReviewJob]) -> Vec<ReviewJob> {
    jobs.iter()
        .filter(|j| j.state == ReviewState::Error)
        .cloned()
        .collect()
}
