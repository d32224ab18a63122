//! The review-queue session: one coordinator per operator session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::api::backend::IngestionBackend;
use crate::api::error::ApiError;
use crate::api::types::{IngestionJob, JobQuery, RawStatus, StatusCounts};
use crate::config::ClientConfig;
use crate::queue::actions::{ensure_all_ready, filter_error_state, BulkActionResult};
use crate::queue::dispatch::RetryDispatcher;
use crate::queue::error::ActionError;
use crate::queue::events::{ActionKind, QueueEvent, QueueEventBroadcaster};
use crate::queue::poller::PollingSynchronizer;
use crate::queue::repository::{FetchOutcome, QueueRepository, QueueSnapshot, ReviewJob};
use crate::queue::selection::SelectionModel;
use crate::queue::status::ReviewState;

/// Releases the bulk-action flag when the action finishes, however it
/// finishes.
struct ActionGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Coordinates the ingestion review queue for one operator session.
///
/// Owns the only mutable client-side state: the last applied snapshot (via
/// the repository) and the selection. Both are mutated exclusively in
/// response to completed, non-superseded operations. Bulk actions are
/// mutually exclusive per session through an atomic in-flight flag; there
/// is no cross-session state, so independent sessions can coexist in one
/// process.
pub struct ReviewQueue {
    backend: Arc<dyn IngestionBackend>,
    repository: Arc<QueueRepository>,
    dispatcher: RetryDispatcher,
    selection: RwLock<SelectionModel>,
    events: QueueEventBroadcaster,
    poller: PollingSynchronizer,
    /// Manual refresh trigger into the poll loop.
    trigger_tx: broadcast::Sender<()>,
    /// Poll loop task handle (to prevent duplicates).
    poll_handle: Mutex<Option<JoinHandle<()>>>,
    /// Pending debounced-search task handle.
    search_handle: Mutex<Option<JoinHandle<()>>>,
    /// Set while a bulk action is in flight.
    action_in_flight: AtomicBool,
    retry_settle: Duration,
    retry_settle_attempts: u32,
}

impl ReviewQueue {
    /// Creates a coordinator over the given backend.
    pub fn new(backend: Arc<dyn IngestionBackend>, config: &ClientConfig) -> Arc<Self> {
        let repository = Arc::new(QueueRepository::new(
            Arc::clone(&backend),
            config.page_size,
            Duration::from_millis(config.search_debounce_ms),
        ));
        let events = QueueEventBroadcaster::default();
        let poller = PollingSynchronizer::new(
            Arc::clone(&repository),
            events.clone(),
            Duration::from_secs(config.poll_interval_secs),
        );
        let (trigger_tx, _) = broadcast::channel(16);

        Arc::new(Self {
            dispatcher: RetryDispatcher::new(Arc::clone(&backend)),
            backend,
            repository,
            selection: RwLock::new(SelectionModel::new()),
            events,
            poller,
            trigger_tx,
            poll_handle: Mutex::new(None),
            search_handle: Mutex::new(None),
            action_in_flight: AtomicBool::new(false),
            retry_settle: Duration::from_millis(config.retry_settle_ms),
            retry_settle_attempts: config.retry_settle_attempts,
        })
    }

    // ── Reads ────────────────────────────────────────────────────────────

    /// Last applied snapshot, if an initial load has completed.
    pub fn snapshot(&self) -> Option<QueueSnapshot> {
        self.repository.snapshot()
    }

    /// Aggregate per-status counts from the last snapshot.
    pub fn status_counts(&self) -> StatusCounts {
        self.repository
            .snapshot()
            .map(|s| s.status_counts)
            .unwrap_or_default()
    }

    /// The current listing query.
    pub fn query(&self) -> JobQuery {
        self.repository.query()
    }

    /// Subscribes to queue events.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    // ── Fetching ─────────────────────────────────────────────────────────

    /// Operator-initiated fetch of the current query.
    ///
    /// Unlike background polls, failures here surface to the caller.
    /// Returns `None` when the response was superseded by a newer fetch.
    pub async fn refresh(&self) -> Result<Option<QueueSnapshot>, ApiError> {
        match self.repository.refresh().await? {
            FetchOutcome::Applied(snapshot) => {
                self.events.send(QueueEvent::SnapshotApplied {
                    total: snapshot.total,
                    status_counts: snapshot.status_counts,
                });
                Ok(Some(snapshot))
            }
            FetchOutcome::Superseded => Ok(None),
        }
    }

    /// Restricts the listing to one raw status and reloads.
    /// Resets the page and clears the selection.
    pub async fn filter_by_status(
        &self,
        status: Option<RawStatus>,
    ) -> Result<Option<QueueSnapshot>, ApiError> {
        self.repository.set_status_filter(status);
        self.clear_selection();
        self.refresh().await
    }

    /// Moves to the given page and reloads. Clears the selection.
    pub async fn goto_page(&self, page: u32) -> Result<Option<QueueSnapshot>, ApiError> {
        self.repository.set_page(page);
        self.clear_selection();
        self.refresh().await
    }

    /// Applies a search-text edit behind the debounce window.
    ///
    /// Returns immediately; the fetch happens in the background once the
    /// quiescence window elapses without a newer edit. Failures of the
    /// debounced fetch are logged and reconciled by the next poll.
    pub fn search(self: &Arc<Self>, text: &str) {
        let queue = Arc::clone(self);
        let text = text.to_string();

        let task = tokio::spawn(async move {
            if !queue.repository.set_search(&text).await {
                return;
            }
            queue.clear_selection();
            if let Err(e) = queue.refresh().await {
                log::warn!("Search fetch failed: {e}");
            }
        });

        let mut guard = match self.search_handle.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = guard.replace(task) {
            previous.abort();
        }
    }

    // ── Polling lifecycle ────────────────────────────────────────────────

    /// Starts background polling. Starting twice is a no-op.
    pub fn start_polling(&self) {
        let mut guard = match self.poll_handle.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.is_some() {
            log::debug!("Polling already running");
            return;
        }
        *guard = Some(self.poller.start(self.trigger_tx.subscribe()));
    }

    /// Reports host-surface visibility; polling is suspended while hidden.
    pub fn set_visible(&self, visible: bool) {
        self.poller.set_visible(visible);
    }

    /// Nudges the poll loop to fetch now instead of at the next tick.
    pub fn request_refresh(&self) {
        let _ = self.trigger_tx.send(());
    }

    /// Stops background polling and any pending debounced search.
    pub fn shutdown(&self) {
        self.poller.stop();
        let _ = self.trigger_tx.send(());

        let mut guard = match self.poll_handle.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.take();

        let mut guard = match self.search_handle.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(task) = guard.take() {
            task.abort();
        }
    }

    // ── Selection ────────────────────────────────────────────────────────

    /// Toggles selection of one visible job. No-op for jobs that are not
    /// on the current page or not in an actionable state.
    pub fn toggle_select(&self, job_id: &str) {
        let Some(snapshot) = self.repository.snapshot() else {
            return;
        };
        let Some(job) = snapshot.jobs.iter().find(|j| j.job.job_id == job_id) else {
            return;
        };
        self.with_selection(|s| s.toggle(job));
    }

    /// Selects every actionable job on the current page.
    pub fn select_all(&self) {
        let Some(snapshot) = self.repository.snapshot() else {
            return;
        };
        self.with_selection(|s| s.select_all(&snapshot.jobs));
    }

    /// Selects every visible job in the given state.
    pub fn select_by_state(&self, state: ReviewState) {
        let Some(snapshot) = self.repository.snapshot() else {
            return;
        };
        self.with_selection(|s| s.select_by_state(&snapshot.jobs, state));
    }

    /// Clears the selection.
    pub fn clear_selection(&self) {
        self.with_selection(|s| s.clear());
    }

    /// Currently selected job ids.
    pub fn selected_ids(&self) -> Vec<String> {
        let guard = match self.selection.read() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Selection lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard.ids()
    }

    /// Number of selected jobs.
    pub fn selection_len(&self) -> usize {
        let guard = match self.selection.read() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Selection lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard.len()
    }

    fn with_selection(&self, f: impl FnOnce(&mut SelectionModel)) {
        let mut guard = match self.selection.write() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Selection lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        f(&mut guard);
    }

    /// Snapshot rows for the current selection. Selection is cleared on
    /// every page/filter/search change, so selected jobs are always on
    /// the visible page.
    fn selected_jobs(&self) -> Vec<ReviewJob> {
        let ids = self.selected_ids();
        let Some(snapshot) = self.repository.snapshot() else {
            return Vec::new();
        };
        snapshot
            .jobs
            .into_iter()
            .filter(|j| ids.iter().any(|id| *id == j.job.job_id))
            .collect()
    }

    // ── Bulk actions ─────────────────────────────────────────────────────

    /// Accepts every selected job into the library.
    ///
    /// Every selected job must currently be Ready; a mixed selection is
    /// rejected client-side with no backend call. Partial backend results
    /// are surfaced verbatim.
    pub async fn accept_selected(self: &Arc<Self>) -> Result<BulkActionResult, ActionError> {
        let _guard = self.begin_action()?;
        let jobs = self.selected_jobs();
        ensure_all_ready(&jobs)?;

        let ids: Vec<String> = jobs.iter().map(|j| j.job.job_id.clone()).collect();
        let outcome = self
            .backend
            .bulk_accept(&ids)
            .await
            .map(BulkActionResult::from)
            .map_err(ActionError::from);

        self.finish_action(ActionKind::Accept, &outcome).await;
        outcome
    }

    /// Rejects every selected job with the given reason. Any actionable
    /// state may be rejected.
    pub async fn reject_selected(
        self: &Arc<Self>,
        reason: &str,
    ) -> Result<BulkActionResult, ActionError> {
        let _guard = self.begin_action()?;
        let jobs = self.selected_jobs();
        if jobs.is_empty() {
            return Err(ActionError::EmptySelection);
        }

        let ids: Vec<String> = jobs.iter().map(|j| j.job.job_id.clone()).collect();
        let outcome = self
            .backend
            .bulk_reject(&ids, reason)
            .await
            .map(BulkActionResult::from)
            .map_err(ActionError::from);

        self.finish_action(ActionKind::Reject, &outcome).await;
        outcome
    }

    /// Retries the failed members of the selection.
    ///
    /// Ready members are silently ignored. Jobs are partitioned between
    /// the pipeline-step and vector-index subsystems and both results are
    /// merged; a transport failure in one partition does not discard the
    /// other's successes.
    pub async fn retry_selected(self: &Arc<Self>) -> Result<BulkActionResult, ActionError> {
        let _guard = self.begin_action()?;
        let jobs = self.selected_jobs();
        if jobs.is_empty() {
            return Err(ActionError::EmptySelection);
        }
        let failed = filter_error_state(&jobs);
        if failed.is_empty() {
            return Err(ActionError::NothingToRetry);
        }

        let raw: Vec<IngestionJob> = failed.iter().map(|j| j.job.clone()).collect();
        let ids: Vec<String> = raw.iter().map(|j| j.job_id.clone()).collect();

        self.events.send(QueueEvent::RetryRequested { count: ids.len() });
        let result = self.dispatcher.retry_many(&raw).await;

        self.repository.mark_retry_requested(&ids);
        self.clear_selection();
        self.events.send(QueueEvent::ActionCompleted {
            action: ActionKind::Retry,
            result,
        });
        self.spawn_retry_settle(ids);

        Ok(result)
    }

    // ── Single-job actions ───────────────────────────────────────────────

    /// Accepts one job. The job must currently be Ready.
    pub async fn accept_job(self: &Arc<Self>, job_id: &str) -> Result<BulkActionResult, ActionError> {
        let _guard = self.begin_action()?;
        let job = self.visible_job(job_id)?;
        ensure_all_ready(std::slice::from_ref(&job))?;

        let outcome = self
            .backend
            .accept_job(job_id)
            .await
            .map(|ack| single_result(ack.ok))
            .map_err(ActionError::from);

        self.finish_action(ActionKind::Accept, &outcome).await;
        outcome
    }

    /// Rejects one job with a reason.
    pub async fn reject_job(
        self: &Arc<Self>,
        job_id: &str,
        reason: &str,
    ) -> Result<BulkActionResult, ActionError> {
        let _guard = self.begin_action()?;
        let _job = self.visible_job(job_id)?;

        let outcome = self
            .backend
            .reject_job(job_id, reason)
            .await
            .map(|ack| single_result(ack.ok))
            .map_err(ActionError::from);

        self.finish_action(ActionKind::Reject, &outcome).await;
        outcome
    }

    /// Retries one failed job against whichever subsystem its signals
    /// select.
    pub async fn retry_job(
        self: &Arc<Self>,
        job_id: &str,
    ) -> Result<BulkActionResult, ActionError> {
        let _guard = self.begin_action()?;
        let job = self.visible_job(job_id)?;
        if job.state != ReviewState::Error {
            return Err(ActionError::NothingToRetry);
        }

        self.events.send(QueueEvent::RetryRequested { count: 1 });
        let outcome = self.dispatcher.retry(&job.job).await?;
        if !outcome.success {
            log::warn!(
                "Retry for {job_id} reported failure: {}",
                outcome.message.as_deref().unwrap_or("no message")
            );
        }

        let ids = vec![job_id.to_string()];
        self.repository.mark_retry_requested(&ids);
        self.with_selection(|s| {
            if s.contains(job_id) {
                s.toggle(&job);
            }
        });
        let result = single_result(outcome.success);
        self.events.send(QueueEvent::ActionCompleted {
            action: ActionKind::Retry,
            result,
        });
        self.spawn_retry_settle(ids);

        Ok(result)
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn begin_action(&self) -> Result<ActionGuard<'_>, ActionError> {
        self.action_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ActionError::Busy)?;
        Ok(ActionGuard {
            flag: &self.action_in_flight,
        })
    }

    fn visible_job(&self, job_id: &str) -> Result<ReviewJob, ActionError> {
        self.repository
            .snapshot()
            .and_then(|s| s.jobs.into_iter().find(|j| j.job.job_id == job_id))
            .ok_or_else(|| ActionError::NotVisible(job_id.to_string()))
    }

    /// Shared post-action path: clear the selection whenever a backend
    /// call was actually made, report the outcome, and re-read the queue.
    async fn finish_action(
        &self,
        action: ActionKind,
        outcome: &Result<BulkActionResult, ActionError>,
    ) {
        self.clear_selection();
        if let Ok(result) = outcome {
            self.events.send(QueueEvent::ActionCompleted {
                action,
                result: *result,
            });
        }
        if let Err(e) = self.refresh().await {
            log::warn!("Post-action queue re-read failed: {e}");
        }
    }

    /// Bounded poll-until-changed loop after a retry dispatch.
    ///
    /// The write response does not guarantee the pipeline has transitioned,
    /// so re-read a few times and stop early once no retried job still
    /// shows the error state. Best-effort: the regular poll loop reconciles
    /// anything missed.
    fn spawn_retry_settle(self: &Arc<Self>, job_ids: Vec<String>) {
        let queue = Arc::clone(self);
        let delay = self.retry_settle;
        let attempts = self.retry_settle_attempts;

        tokio::spawn(async move {
            for attempt in 0..attempts {
                tokio::time::sleep(delay).await;
                match queue.refresh().await {
                    Ok(Some(snapshot)) => {
                        let still_failed = snapshot.jobs.iter().any(|j| {
                            j.state == ReviewState::Error
                                && job_ids.iter().any(|id| *id == j.job.job_id)
                        });
                        if !still_failed {
                            log::debug!(
                                "Retried jobs settled after {} re-read(s)",
                                attempt + 1
                            );
                            break;
                        }
                    }
                    // A newer fetch took over; its snapshot stands.
                    Ok(None) => {}
                    Err(e) => log::debug!("Settle re-read failed: {e}"),
                }
            }
        });
    }
}

fn single_result(ok: bool) -> BulkActionResult {
    if ok {
        BulkActionResult {
            succeeded: 1,
            failed: 0,
            skipped: 0,
        }
    } else {
        BulkActionResult {
            succeeded: 0,
            failed: 1,
            skipped: 0,
        }
    }
}

impl Drop for ReviewQueue {
    fn drop(&mut self) {
        self.poller.stop();
        let _ = self.trigger_tx.send(());
    }
}
