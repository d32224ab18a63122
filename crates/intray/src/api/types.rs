//! Wire types for the ingestion platform API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw pipeline status reported by the server.
///
/// Unrecognized values deserialize to [`RawStatus::Unknown`] so a newer
/// server never breaks an older client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RawStatus {
    Pending,
    Processing,
    NeedsReview,
    Failed,
    #[serde(other)]
    Unknown,
}

impl RawStatus {
    /// Query-string value for the status filter.
    pub fn as_str(&self) -> &'static str {
        match self {
            RawStatus::Pending => "pending",
            RawStatus::Processing => "processing",
            RawStatus::NeedsReview => "needs_review",
            RawStatus::Failed => "failed",
            RawStatus::Unknown => "unknown",
        }
    }
}

/// Vector-index synchronization status, independent of [`RawStatus`].
///
/// Absence on the job record means indexing has not been attempted yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VectorSyncStatus {
    Pending,
    Synced,
    Failed,
    Partial,
    #[serde(other)]
    Unknown,
}

/// Best-effort structured fields produced by the extraction pipeline.
/// Any subset may be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Identity metadata for the submitting user. Informational only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Submitter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// One document submission in flight or recently resolved.
///
/// `raw_status` and the vector-sync fields are independent axes: a job can
/// be `needs_review` while its vector-index signals show failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionJob {
    /// Unique job identifier.
    pub job_id: String,
    /// Stable document reference; the eventual library key.
    pub document_id: String,
    /// Authoritative server-side pipeline state.
    pub raw_status: RawStatus,
    /// When the document was submitted.
    pub submitted_at: DateTime<Utc>,
    /// When pipeline processing started (if it has).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_started_at: Option<DateTime<Utc>>,
    /// When the pipeline finished (if it has).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Free-text diagnostic, present only when `raw_status` is `failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Fields extracted by the pipeline so far; may be partial or absent.
    #[serde(default)]
    pub extracted_metadata: ExtractedMetadata,
    /// Vector-index sync state; `None` means not yet attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_sync_status: Option<VectorSyncStatus>,
    /// Number of failed vector-index pipeline steps.
    #[serde(default)]
    pub vector_steps_failed: u32,
    /// Number of failed vector-index chunks.
    #[serde(default)]
    pub vector_chunks_failed: u32,
    /// Who submitted the document.
    #[serde(default)]
    pub submitter: Submitter,
}

/// Parameters for a job listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobQuery {
    /// Restrict the listing to one raw status.
    pub status: Option<RawStatus>,
    /// Free-text search over filename/metadata; empty means no search.
    pub search: String,
    /// One-based page number.
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
}

impl JobQuery {
    /// Creates a query for the first page with the given page size.
    pub fn first_page(page_size: u32) -> Self {
        Self {
            status: None,
            search: String::new(),
            page: 1,
            page_size,
        }
    }
}

/// Aggregate per-status counts, independent of the requested page.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusCounts {
    pub pending: u64,
    pub processing: u64,
    pub needs_review: u64,
    pub failed: u64,
}

impl StatusCounts {
    /// Total jobs across all raw statuses.
    pub fn total(&self) -> u64 {
        self.pending + self.processing + self.needs_review + self.failed
    }
}

/// One page of the job listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPage {
    pub items: Vec<IngestionJob>,
    pub total: u64,
    pub total_pages: u32,
    #[serde(default)]
    pub status_counts: StatusCounts,
}

/// Acknowledgement for single-job accept/reject.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckResponse {
    pub ok: bool,
}

/// Response to a bulk accept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAcceptResponse {
    pub accepted: u32,
    pub failed: u32,
}

/// Response to a bulk reject.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRejectResponse {
    pub rejected: u32,
    pub failed: u32,
}

/// Response to a single pipeline-step retry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response to a single vector-index retry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorRetryResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub steps_retried: u32,
    #[serde(default)]
    pub chunks_retried: u32,
}

/// Response to a bulk retry against either subsystem.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRetryResponse {
    pub success: bool,
    #[serde(default)]
    pub retried: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub failed: u32,
}
