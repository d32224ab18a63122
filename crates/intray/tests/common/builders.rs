//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use chrono::Utc;
use intray::api::types::{ExtractedMetadata, IngestionJob, Submitter, VectorSyncStatus};
use intray::api::RawStatus;

/// Builder for [`IngestionJob`] records.
pub struct JobBuilder {
    job_id: String,
    raw_status: RawStatus,
    failure_reason: Option<String>,
    title: Option<String>,
    vector_sync_status: Option<VectorSyncStatus>,
    vector_steps_failed: u32,
    vector_chunks_failed: u32,
}

impl JobBuilder {
    /// Creates a builder for a pending job with the given id.
    pub fn new(job_id: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            raw_status: RawStatus::Pending,
            failure_reason: None,
            title: None,
            vector_sync_status: None,
            vector_steps_failed: 0,
            vector_chunks_failed: 0,
        }
    }

    /// Shorthand for a job that is ready for review.
    pub fn ready(job_id: &str) -> Self {
        Self::new(job_id).status(RawStatus::NeedsReview)
    }

    /// Shorthand for a job whose extraction failed.
    pub fn failed(job_id: &str) -> Self {
        Self::new(job_id)
            .status(RawStatus::Failed)
            .failure_reason("extraction failed")
    }

    /// Sets the raw pipeline status.
    pub fn status(mut self, status: RawStatus) -> Self {
        self.raw_status = status;
        self
    }

    /// Sets the failure diagnostic.
    pub fn failure_reason(mut self, reason: &str) -> Self {
        self.failure_reason = Some(reason.to_string());
        self
    }

    /// Sets the extracted title.
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Sets the vector-index sync status.
    pub fn vector_status(mut self, status: VectorSyncStatus) -> Self {
        self.vector_sync_status = Some(status);
        self
    }

    /// Sets the failed vector step count.
    pub fn vector_steps_failed(mut self, count: u32) -> Self {
        self.vector_steps_failed = count;
        self
    }

    /// Sets the failed vector chunk count.
    pub fn vector_chunks_failed(mut self, count: u32) -> Self {
        self.vector_chunks_failed = count;
        self
    }

    /// Builds the job record.
    pub fn build(self) -> IngestionJob {
        IngestionJob {
            document_id: format!("doc-{}", self.job_id),
            job_id: self.job_id,
            raw_status: self.raw_status,
            submitted_at: Utc::now(),
            processing_started_at: None,
            completed_at: None,
            failure_reason: self.failure_reason,
            extracted_metadata: ExtractedMetadata {
                title: self.title,
                ..Default::default()
            },
            vector_sync_status: self.vector_sync_status,
            vector_steps_failed: self.vector_steps_failed,
            vector_chunks_failed: self.vector_chunks_failed,
            submitter: Submitter {
                name: Some("Test Operator".to_string()),
                email: Some("operator@example.com".to_string()),
                role: Some("operator".to_string()),
            },
        }
    }
}
