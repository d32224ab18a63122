//! Retry routing between the extraction pipeline and the vector index.

use std::sync::Arc;

use futures_util::future;

use crate::api::backend::IngestionBackend;
use crate::api::error::Result as ApiResult;
use crate::api::types::{BulkRetryResponse, IngestionJob, VectorSyncStatus};
use crate::queue::actions::BulkActionResult;

/// Which backend subsystem a retry targets.
///
/// Exactly one subsystem is invoked per job; the two are never tried
/// speculatively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryTarget {
    /// Re-run failed extraction pipeline steps.
    PipelineSteps,
    /// Re-run failed vector-index steps/chunks.
    VectorIndex,
}

/// Decides which subsystem must handle a retry for this job.
///
/// The vector index wins whenever any of its failure signals is present:
/// a failed or partial sync, failed steps, or failed chunks. Everything
/// else goes to the pipeline-step retry.
pub fn retry_target(job: &IngestionJob) -> RetryTarget {
    let vector_failed = matches!(
        job.vector_sync_status,
        Some(VectorSyncStatus::Failed) | Some(VectorSyncStatus::Partial)
    );
    if vector_failed || job.vector_steps_failed > 0 || job.vector_chunks_failed > 0 {
        RetryTarget::VectorIndex
    } else {
        RetryTarget::PipelineSteps
    }
}

/// Outcome of a single-job retry.
#[derive(Debug, Clone)]
pub struct RetryOutcome {
    pub target: RetryTarget,
    pub success: bool,
    pub message: Option<String>,
}

/// Routes retries to the correct subsystem and merges bulk outcomes.
pub struct RetryDispatcher {
    backend: Arc<dyn IngestionBackend>,
}

impl RetryDispatcher {
    /// Creates a dispatcher over the given backend.
    pub fn new(backend: Arc<dyn IngestionBackend>) -> Self {
        Self { backend }
    }

    /// Retries one job against whichever subsystem its signals select.
    pub async fn retry(&self, job: &IngestionJob) -> ApiResult<RetryOutcome> {
        let target = retry_target(job);
        match target {
            RetryTarget::VectorIndex => {
                let response = self.backend.retry_vector_index(&job.job_id).await?;
                log::info!(
                    "Vector-index retry for {}: {} steps, {} chunks",
                    job.job_id,
                    response.steps_retried,
                    response.chunks_retried
                );
                Ok(RetryOutcome {
                    target,
                    success: response.success,
                    message: response.message,
                })
            }
            RetryTarget::PipelineSteps => {
                let response = self.backend.retry_pipeline_steps(&job.job_id).await?;
                Ok(RetryOutcome {
                    target,
                    success: response.success,
                    message: response.message,
                })
            }
        }
    }

    /// Retries a set of jobs, partitioned by subsystem.
    ///
    /// Issues at most two backend calls (one bulk request per subsystem,
    /// never one per job) and merges the results additively. A transport
    /// failure in one partition counts that partition's jobs as failed
    /// without discarding the other partition's outcome.
    pub async fn retry_many(&self, jobs: &[IngestionJob]) -> BulkActionResult {
        let mut pipeline_ids = Vec::new();
        let mut vector_ids = Vec::new();
        for job in jobs {
            match retry_target(job) {
                RetryTarget::PipelineSteps => pipeline_ids.push(job.job_id.clone()),
                RetryTarget::VectorIndex => vector_ids.push(job.job_id.clone()),
            }
        }

        let (pipeline, vector) = future::join(
            self.bulk_call(RetryTarget::PipelineSteps, &pipeline_ids),
            self.bulk_call(RetryTarget::VectorIndex, &vector_ids),
        )
        .await;

        let mut result = pipeline;
        result.merge(vector);
        result
    }

    async fn bulk_call(&self, target: RetryTarget, job_ids: &[String]) -> BulkActionResult {
        if job_ids.is_empty() {
            return BulkActionResult::default();
        }

        let response: ApiResult<BulkRetryResponse> = match target {
            RetryTarget::PipelineSteps => self.backend.retry_pipeline_steps_bulk(job_ids).await,
            RetryTarget::VectorIndex => self.backend.retry_vector_index_bulk(job_ids).await,
        };

        match response {
            Ok(response) => response.into(),
            Err(e) => {
                log::error!("Bulk retry ({target:?}) failed for {} jobs: {e}", job_ids.len());
                BulkActionResult::all_failed(job_ids.len())
            }
        }
    }
}
