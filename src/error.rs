//! Gateway error type

use thiserror::Error;

use crate::duration::DurationError;

/// Errors surfaced by the alert gateway and its transport.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The proxy (or the cluster behind it) answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    MalformedResponse(String),

    /// A batch operation was called without any alert IDs.
    #[error("{0}: no alert IDs given")]
    EmptyBatch(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Duration(#[from] DurationError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl GatewayError {
    /// True when the cluster answered 404 (missing watch, script, job).
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::Status { status: 404, .. })
    }
}
