//! Shared test support: job builders and an in-memory platform backend.

#![allow(dead_code)]

mod builders;

pub use builders::JobBuilder;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use intray::api::error::{ApiError, Result as ApiResult};
use intray::api::types::{
    AckResponse, BulkAcceptResponse, BulkRejectResponse, BulkRetryResponse, IngestionJob, JobPage,
    JobQuery, RawStatus, RetryResponse, StatusCounts, VectorRetryResponse,
};
use intray::api::IngestionBackend;
use intray::{ClientConfig, ReviewQueue};

/// In-memory stand-in for the ingestion platform.
///
/// Holds a mutable job set, answers listings with real filtering,
/// pagination, and aggregate counts, and records every write call so
/// tests can assert on exactly what was dispatched. Listing latency can
/// be scripted per call to overlap fetches deterministically.
#[derive(Default)]
pub struct FakeBackend {
    jobs: Mutex<Vec<IngestionJob>>,
    list_latency: Mutex<VecDeque<Duration>>,
    action_latency: Mutex<Option<Duration>>,
    list_fail: AtomicBool,
    accept_response: Mutex<Option<BulkAcceptResponse>>,

    pub list_calls: AtomicU64,
    pub accepted_single: Mutex<Vec<String>>,
    pub rejected_single: Mutex<Vec<(String, String)>>,
    pub accepted_bulk: Mutex<Vec<Vec<String>>>,
    pub rejected_bulk: Mutex<Vec<(Vec<String>, String)>>,
    pub pipeline_retried: Mutex<Vec<Vec<String>>>,
    pub vector_retried: Mutex<Vec<Vec<String>>>,
}

impl FakeBackend {
    pub fn with_jobs(jobs: Vec<IngestionJob>) -> Arc<Self> {
        let backend = Self::default();
        *backend.jobs.lock().unwrap() = jobs;
        Arc::new(backend)
    }

    /// Replaces the job set (subsequent listings see the new data).
    pub fn set_jobs(&self, jobs: Vec<IngestionJob>) {
        *self.jobs.lock().unwrap() = jobs;
    }

    /// Queues an artificial latency for the next listing call.
    pub fn push_list_latency(&self, latency: Duration) {
        self.list_latency.lock().unwrap().push_back(latency);
    }

    /// Applies an artificial latency to every write call.
    pub fn set_action_latency(&self, latency: Duration) {
        *self.action_latency.lock().unwrap() = Some(latency);
    }

    /// Makes listing calls fail with a transport error.
    pub fn set_list_fail(&self, fail: bool) {
        self.list_fail.store(fail, Ordering::SeqCst);
    }

    /// Scripts the response of the next bulk accept instead of the
    /// default remove-and-count behavior.
    pub fn script_accept_response(&self, response: BulkAcceptResponse) {
        *self.accept_response.lock().unwrap() = Some(response);
    }

    async fn action_delay(&self) {
        let latency = *self.action_latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn counts(jobs: &[IngestionJob]) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for job in jobs {
            match job.raw_status {
                RawStatus::Pending => counts.pending += 1,
                RawStatus::Processing => counts.processing += 1,
                RawStatus::NeedsReview => counts.needs_review += 1,
                RawStatus::Failed => counts.failed += 1,
                RawStatus::Unknown => {}
            }
        }
        counts
    }

    fn remove_jobs(&self, job_ids: &[String]) -> u32 {
        let mut jobs = self.jobs.lock().unwrap();
        let before = jobs.len();
        jobs.retain(|j| !job_ids.contains(&j.job_id));
        (before - jobs.len()) as u32
    }

    /// Flips the matched failed jobs back to processing, as the platform
    /// does when a retry is queued.
    fn requeue_jobs(&self, job_ids: &[String]) -> u32 {
        let mut jobs = self.jobs.lock().unwrap();
        let mut requeued = 0;
        for job in jobs.iter_mut() {
            if job_ids.contains(&job.job_id) && job.raw_status == RawStatus::Failed {
                job.raw_status = RawStatus::Processing;
                job.failure_reason = None;
                requeued += 1;
            }
        }
        requeued
    }
}

#[async_trait]
impl IngestionBackend for FakeBackend {
    async fn list_jobs(&self, query: &JobQuery) -> ApiResult<JobPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let latency = self.list_latency.lock().unwrap().pop_front();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.list_fail.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection refused".into()));
        }

        let jobs = self.jobs.lock().unwrap();
        let status_counts = Self::counts(&jobs);

        let filtered: Vec<IngestionJob> = jobs
            .iter()
            .filter(|j| query.status.map_or(true, |s| j.raw_status == s))
            .filter(|j| {
                query.search.is_empty()
                    || j.job_id.contains(&query.search)
                    || j.extracted_metadata
                        .title
                        .as_deref()
                        .is_some_and(|t| t.contains(&query.search))
            })
            .cloned()
            .collect();

        let total = filtered.len() as u64;
        let page_size = query.page_size.max(1) as usize;
        let total_pages = filtered.len().div_ceil(page_size) as u32;
        let start = (query.page.max(1) as usize - 1) * page_size;
        let items = filtered.into_iter().skip(start).take(page_size).collect();

        Ok(JobPage {
            items,
            total,
            total_pages,
            status_counts,
        })
    }

    async fn accept_job(&self, job_id: &str) -> ApiResult<AckResponse> {
        self.action_delay().await;
        self.accepted_single.lock().unwrap().push(job_id.to_string());
        let removed = self.remove_jobs(&[job_id.to_string()]);
        Ok(AckResponse { ok: removed == 1 })
    }

    async fn reject_job(&self, job_id: &str, reason: &str) -> ApiResult<AckResponse> {
        self.action_delay().await;
        self.rejected_single
            .lock()
            .unwrap()
            .push((job_id.to_string(), reason.to_string()));
        let removed = self.remove_jobs(&[job_id.to_string()]);
        Ok(AckResponse { ok: removed == 1 })
    }

    async fn bulk_accept(&self, job_ids: &[String]) -> ApiResult<BulkAcceptResponse> {
        self.action_delay().await;
        self.accepted_bulk.lock().unwrap().push(job_ids.to_vec());

        if let Some(scripted) = self.accept_response.lock().unwrap().take() {
            return Ok(scripted);
        }
        let accepted = self.remove_jobs(job_ids);
        Ok(BulkAcceptResponse {
            accepted,
            failed: job_ids.len() as u32 - accepted,
        })
    }

    async fn bulk_reject(&self, job_ids: &[String], reason: &str) -> ApiResult<BulkRejectResponse> {
        self.action_delay().await;
        self.rejected_bulk
            .lock()
            .unwrap()
            .push((job_ids.to_vec(), reason.to_string()));
        let rejected = self.remove_jobs(job_ids);
        Ok(BulkRejectResponse {
            rejected,
            failed: job_ids.len() as u32 - rejected,
        })
    }

    async fn retry_pipeline_steps(&self, job_id: &str) -> ApiResult<RetryResponse> {
        self.action_delay().await;
        self.pipeline_retried
            .lock()
            .unwrap()
            .push(vec![job_id.to_string()]);
        self.requeue_jobs(&[job_id.to_string()]);
        Ok(RetryResponse {
            success: true,
            message: None,
        })
    }

    async fn retry_pipeline_steps_bulk(&self, job_ids: &[String]) -> ApiResult<BulkRetryResponse> {
        self.action_delay().await;
        self.pipeline_retried.lock().unwrap().push(job_ids.to_vec());
        let retried = self.requeue_jobs(job_ids);
        Ok(BulkRetryResponse {
            success: true,
            retried,
            skipped: job_ids.len() as u32 - retried,
            failed: 0,
        })
    }

    async fn retry_vector_index(&self, job_id: &str) -> ApiResult<VectorRetryResponse> {
        self.action_delay().await;
        self.vector_retried
            .lock()
            .unwrap()
            .push(vec![job_id.to_string()]);
        self.requeue_jobs(&[job_id.to_string()]);
        Ok(VectorRetryResponse {
            success: true,
            message: None,
            steps_retried: 1,
            chunks_retried: 1,
        })
    }

    async fn retry_vector_index_bulk(&self, job_ids: &[String]) -> ApiResult<BulkRetryResponse> {
        self.action_delay().await;
        self.vector_retried.lock().unwrap().push(job_ids.to_vec());
        let retried = self.requeue_jobs(job_ids);
        Ok(BulkRetryResponse {
            success: true,
            retried,
            skipped: job_ids.len() as u32 - retried,
            failed: 0,
        })
    }
}

/// Test configuration with short windows so paused-time tests stay fast.
pub fn test_config() -> ClientConfig {
    ClientConfig {
        search_debounce_ms: 300,
        retry_settle_ms: 50,
        retry_settle_attempts: 3,
        ..ClientConfig::for_base_url("https://platform.example.com")
    }
}

/// Builds a coordinator over the backend and performs the initial load.
pub async fn loaded_queue(backend: Arc<FakeBackend>) -> Arc<ReviewQueue> {
    let queue = ReviewQueue::new(backend as Arc<dyn IngestionBackend>, &test_config());
    queue
        .refresh()
        .await
        .expect("initial load")
        .expect("initial load applied");
    queue
}
