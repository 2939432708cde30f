use thiserror::Error;

/// Errors from the gallery listing upstream.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("Gallery request timed out")]
    Timeout,

    #[error("Connection to gallery upstream failed: {0}")]
    ConnectionFailed(String),

    #[error("Gallery request failed: {0}")]
    Request(String),

    #[error("Gallery upstream returned invalid JSON: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GalleryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::ConnectionFailed(e.to_string())
        } else if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}
