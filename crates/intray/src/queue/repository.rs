//! Queue read access: query state, snapshots, and race-safe fetching.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::api::backend::IngestionBackend;
use crate::api::error::ApiError;
use crate::api::types::{IngestionJob, JobQuery, RawStatus, StatusCounts};
use crate::queue::status::ReviewState;

/// A job as shown in the review queue: the raw record plus its derived
/// state and the client-side retry hint.
#[derive(Debug, Clone)]
pub struct ReviewJob {
    pub job: IngestionJob,
    /// Derived on every fetch; never cached across reads.
    pub state: ReviewState,
    /// Set after a retry dispatch succeeds; dropped on the next applied
    /// authoritative read, never inferred from the write response alone.
    pub retry_requested: bool,
}

impl ReviewJob {
    /// Wraps a raw job record, deriving its review state.
    pub fn from_job(job: IngestionJob) -> Self {
        let state = ReviewState::of(&job);
        Self {
            job,
            state,
            retry_requested: false,
        }
    }
}

/// The last applied page of the review queue.
#[derive(Debug, Clone)]
pub struct QueueSnapshot {
    pub jobs: Vec<ReviewJob>,
    pub total: u64,
    pub total_pages: u32,
    pub status_counts: StatusCounts,
    /// The query this snapshot answers.
    pub query: JobQuery,
    pub fetched_at: DateTime<Utc>,
}

/// Outcome of a fetch attempt.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The response was current and has been applied.
    Applied(QueueSnapshot),
    /// A newer fetch was issued while this one was in flight; the response
    /// was discarded without being applied.
    Superseded,
}

/// Read access to the review queue.
///
/// Owns the current query and the last applied snapshot. Every fetch
/// carries a sequence number; a response is applied only when its sequence
/// still equals the latest issued, so overlapping fetches resolve
/// last-sequence-wins with no lock around the network call.
pub struct QueueRepository {
    backend: Arc<dyn IngestionBackend>,
    query: RwLock<JobQuery>,
    snapshot: RwLock<Option<QueueSnapshot>>,
    /// Sequence of the most recently issued fetch.
    issue_seq: AtomicU64,
    /// Sequence of the fetch whose response was last applied.
    applied_seq: AtomicU64,
    /// Generation counter for pending search edits.
    search_epoch: AtomicU64,
    debounce: Duration,
}

impl QueueRepository {
    /// Creates a repository over the given backend.
    pub fn new(backend: Arc<dyn IngestionBackend>, page_size: u32, debounce: Duration) -> Self {
        Self {
            backend,
            query: RwLock::new(JobQuery::first_page(page_size)),
            snapshot: RwLock::new(None),
            issue_seq: AtomicU64::new(0),
            applied_seq: AtomicU64::new(0),
            search_epoch: AtomicU64::new(0),
            debounce,
        }
    }

    /// Returns the current query.
    pub fn query(&self) -> JobQuery {
        let guard = match self.query.read() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Queue query lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard.clone()
    }

    /// Returns the last applied snapshot, if any.
    pub fn snapshot(&self) -> Option<QueueSnapshot> {
        let guard = match self.snapshot.read() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Queue snapshot lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard.clone()
    }

    /// Restricts the listing to one raw status and resets to page one.
    /// Any in-flight fetch is superseded.
    pub fn set_status_filter(&self, status: Option<RawStatus>) {
        self.mutate_query(|q| {
            q.status = status;
            q.page = 1;
        });
    }

    /// Moves to the given page. Any in-flight fetch is superseded.
    pub fn set_page(&self, page: u32) {
        self.mutate_query(|q| q.page = page.max(1));
    }

    /// Applies a search-text edit after the debounce window.
    ///
    /// Each edit bumps the search generation and then waits out the
    /// quiescence window; only the edit that is still the latest when its
    /// window elapses commits to the query. Returns `false` when the edit
    /// was superseded by a newer one (no query change, no fetch needed).
    pub async fn set_search(&self, text: &str) -> bool {
        let epoch = self.search_epoch.fetch_add(1, Ordering::AcqRel) + 1;
        tokio::time::sleep(self.debounce).await;
        if self.search_epoch.load(Ordering::Acquire) != epoch {
            log::debug!("Search edit superseded before debounce elapsed");
            return false;
        }

        self.mutate_query(|q| {
            q.search = text.to_string();
            q.page = 1;
        });
        true
    }

    /// Fetches the current query and applies the result unless a newer
    /// fetch was issued in the meantime.
    ///
    /// Transport and server failures surface as [`ApiError`]; whether they
    /// reach the operator is the caller's decision (background polls log
    /// and skip, operator-initiated fetches report).
    pub async fn refresh(&self) -> Result<FetchOutcome, ApiError> {
        let seq = self.issue_seq.fetch_add(1, Ordering::AcqRel) + 1;
        let query = self.query();

        let page = self.backend.list_jobs(&query).await?;

        if self.issue_seq.load(Ordering::Acquire) != seq {
            log::debug!("Discarding stale queue response (seq {seq})");
            return Ok(FetchOutcome::Superseded);
        }

        let snapshot = QueueSnapshot {
            jobs: page.items.into_iter().map(ReviewJob::from_job).collect(),
            total: page.total,
            total_pages: page.total_pages,
            status_counts: page.status_counts,
            query,
            fetched_at: Utc::now(),
        };

        let mut guard = match self.snapshot.write() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Queue snapshot lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        // Re-check under the lock: a newer response may have been applied
        // between the sequence check and here.
        if self.applied_seq.load(Ordering::Acquire) > seq {
            log::debug!("Discarding stale queue response (seq {seq})");
            return Ok(FetchOutcome::Superseded);
        }
        self.applied_seq.store(seq, Ordering::Release);
        *guard = Some(snapshot.clone());
        Ok(FetchOutcome::Applied(snapshot))
    }

    /// Marks jobs in the current snapshot as retry-requested.
    ///
    /// Display-only hint; the next applied read replaces the snapshot
    /// wholesale and with it drops the hint.
    pub fn mark_retry_requested(&self, job_ids: &[String]) {
        let mut guard = match self.snapshot.write() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Queue snapshot lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        if let Some(snapshot) = guard.as_mut() {
            for job in snapshot.jobs.iter_mut() {
                if job_ids.iter().any(|id| *id == job.job.job_id) {
                    job.retry_requested = true;
                }
            }
        }
    }

    /// Supersedes any in-flight fetch without changing the query.
    pub fn invalidate(&self) {
        self.issue_seq.fetch_add(1, Ordering::AcqRel);
    }

    fn mutate_query(&self, f: impl FnOnce(&mut JobQuery)) {
        {
            let mut guard = match self.query.write() {
                Ok(g) => g,
                Err(poisoned) => {
                    log::warn!("Queue query lock was poisoned, recovering");
                    poisoned.into_inner()
                }
            };
            f(&mut guard);
        }
        self.invalidate();
    }
}
