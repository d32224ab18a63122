pub mod backend;
pub mod error;
pub mod http;
pub mod types;

pub use backend::IngestionBackend;
pub use error::ApiError;
pub use http::HttpBackend;
pub use types::{
    AckResponse, BulkAcceptResponse, BulkRejectResponse, BulkRetryResponse, ExtractedMetadata,
    IngestionJob, JobPage, JobQuery, RawStatus, RetryResponse, StatusCounts, Submitter,
    VectorRetryResponse, VectorSyncStatus,
};
