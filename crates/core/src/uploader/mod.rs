//! Uploader module for submitting staged files to the remote upload server.
//!
//! The `Uploader` trait is the seam the orchestrator talks to. `HttpUploader`
//! is the real multipart client; `testing::MockUploader` scripts outcomes.

mod error;
mod http;
mod traits;
mod types;

pub use error::UploadError;
pub use http::HttpUploader;
pub use traits::Uploader;
pub use types::{UploadMetadata, UploadReceipt, UploadRequest};
