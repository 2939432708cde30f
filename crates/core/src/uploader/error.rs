//! Error types for the uploader module.

use thiserror::Error;

/// Errors that can occur while submitting a file to the upload endpoint.
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    /// The request did not complete in time.
    #[error("Upload timed out")]
    Timeout,

    /// Could not reach the upload server.
    #[error("Connection to upload server failed: {0}")]
    ConnectionFailed(String),

    /// The server answered with a non-success status.
    #[error("Upload failed: HTTP {status}")]
    Rejected { status: u16, body: String },

    /// The server accepted the upload but the body was not understood.
    #[error("Invalid upload response: {0}")]
    InvalidResponse(String),

    /// The submission could not be built.
    #[error("Invalid upload request: {0}")]
    InvalidRequest(String),

    /// Any other transport error.
    #[error("Upload request failed: {0}")]
    Transport(String),
}

impl UploadError {
    /// Map a reqwest error onto the matching variant.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::ConnectionFailed(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }

    /// Whether the failure happened before the server produced a response.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::ConnectionFailed(_) | Self::Transport(_)
        )
    }

    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::ConnectionFailed(_) => "connection_failed",
            Self::Rejected { .. } => "rejected",
            Self::InvalidResponse(_) => "invalid_response",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Transport(_) => "transport",
        }
    }
}
