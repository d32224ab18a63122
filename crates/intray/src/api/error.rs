//! Platform API error types.

use thiserror::Error;

/// Maximum length for error bodies echoed into messages, to keep logs
/// readable and avoid leaking large payloads.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Truncates a server error body to a loggable length.
pub(crate) fn truncate_error_body(body: &str) -> String {
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i < MAX_ERROR_BODY_LENGTH)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}... (truncated)", &body[..cut])
    } else {
        body.to_string()
    }
}

/// Errors from talking to the ingestion platform.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never completed: connect failure, timeout, or the
    /// connection dropped before a response arrived.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded into the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The configured base URL or a derived request URL is invalid.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// True for failures where the call may never have reached the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
