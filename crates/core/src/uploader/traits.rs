//! Trait definitions for the uploader module.

use async_trait::async_trait;

use super::error::UploadError;
use super::types::{UploadReceipt, UploadRequest};

/// Submits one file to a remote upload endpoint.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Returns the name of this uploader implementation.
    fn name(&self) -> &str;

    /// Submit a single file and wait for the endpoint's answer.
    async fn upload(&self, request: UploadRequest) -> Result<UploadReceipt, UploadError>;
}
