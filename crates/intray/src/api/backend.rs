//! Backend abstraction for the ingestion platform.
//!
//! The coordinator talks to the platform exclusively through
//! [`IngestionBackend`], so the review-queue logic can be exercised against
//! an in-memory implementation without a server.

use async_trait::async_trait;

use crate::api::error::Result;
use crate::api::types::{
    AckResponse, BulkAcceptResponse, BulkRejectResponse, BulkRetryResponse, JobPage, JobQuery,
    RetryResponse, VectorRetryResponse,
};

/// Operations the ingestion platform exposes to review clients.
///
/// Bulk operations are atomic per item, not as a whole; partial success is
/// the normal case and is reported through the response counters.
#[async_trait]
pub trait IngestionBackend: Send + Sync {
    /// Lists jobs matching the query, with aggregate status counts.
    async fn list_jobs(&self, query: &JobQuery) -> Result<JobPage>;

    /// Accepts a single reviewed job into the library.
    async fn accept_job(&self, job_id: &str) -> Result<AckResponse>;

    /// Rejects a single job with an operator-supplied reason.
    async fn reject_job(&self, job_id: &str, reason: &str) -> Result<AckResponse>;

    /// Accepts a set of jobs in one call.
    async fn bulk_accept(&self, job_ids: &[String]) -> Result<BulkAcceptResponse>;

    /// Rejects a set of jobs in one call.
    async fn bulk_reject(&self, job_ids: &[String], reason: &str) -> Result<BulkRejectResponse>;

    /// Re-runs the failed extraction pipeline steps for one job.
    async fn retry_pipeline_steps(&self, job_id: &str) -> Result<RetryResponse>;

    /// Re-runs failed extraction pipeline steps for a set of jobs.
    async fn retry_pipeline_steps_bulk(&self, job_ids: &[String]) -> Result<BulkRetryResponse>;

    /// Re-runs failed vector-index steps and chunks for one job.
    async fn retry_vector_index(&self, job_id: &str) -> Result<VectorRetryResponse>;

    /// Re-runs failed vector-index work for a set of jobs.
    async fn retry_vector_index_bulk(&self, job_ids: &[String]) -> Result<BulkRetryResponse>;
}
