//! Client library for the Intray document-ingestion platform.
//!
//! Documents uploaded to the platform pass through an asynchronous
//! pipeline (extraction and classification, then vector-index
//! synchronization) before they become visible in the library. This crate
//! implements the review-queue side of that flow: it tracks in-flight
//! ingestion jobs, derives the unified state an operator reviews against,
//! routes retries to the pipeline or the vector index, and executes
//! single and bulk accept/reject/retry operations safely while background
//! polling keeps the queue fresh.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod queue;

pub use api::{HttpBackend, IngestionBackend, IngestionJob, JobQuery, RawStatus, StatusCounts};
pub use config::{load_config, ClientConfig};
pub use error::{ConfigError, IntrayError, Result};
pub use queue::{
    ActionError, BulkActionResult, QueueEvent, QueueSnapshot, ReviewQueue, ReviewState,
};
