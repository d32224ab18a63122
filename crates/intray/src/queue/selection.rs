//! Client-side selection over the visible page.

use std::collections::HashSet;

use crate::queue::repository::ReviewJob;
use crate::queue::status::ReviewState;

/// The set of selected job ids.
///
/// Selection is client-side memory only: it is restricted to jobs an
/// operator can act on, never reaches across unfetched pages, and is reset
/// whenever the filter, search text, or page changes and after every bulk
/// action completes.
#[derive(Debug, Default)]
pub struct SelectionModel {
    selected: HashSet<String>,
}

impl SelectionModel {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// True for jobs an operator can act on.
    pub fn is_eligible(job: &ReviewJob) -> bool {
        job.state.is_actionable()
    }

    /// Toggles one job. A toggle on an ineligible job is a no-op.
    pub fn toggle(&mut self, job: &ReviewJob) {
        if !Self::is_eligible(job) {
            return;
        }
        if !self.selected.remove(&job.job.job_id) {
            self.selected.insert(job.job.job_id.clone());
        }
    }

    /// Selects the eligible subset of the visible page.
    pub fn select_all(&mut self, page: &[ReviewJob]) {
        for job in page.iter().filter(|j| Self::is_eligible(j)) {
            self.selected.insert(job.job.job_id.clone());
        }
    }

    /// Selects every visible job in the given state. States outside the
    /// eligible set select nothing.
    pub fn select_by_state(&mut self, page: &[ReviewJob], state: ReviewState) {
        if !state.is_actionable() {
            return;
        }
        for job in page.iter().filter(|j| j.state == state) {
            self.selected.insert(job.job.job_id.clone());
        }
    }

    /// Clears the selection.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// True when the job is selected.
    pub fn contains(&self, job_id: &str) -> bool {
        self.selected.contains(job_id)
    }

    /// Selected ids in unspecified order.
    pub fn ids(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
