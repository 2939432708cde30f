//! HTTP multipart uploader.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use tracing::debug;

use crate::config::UploadConfig;

use super::{UploadError, UploadReceipt, UploadRequest, Uploader};

/// Uploads files as `multipart/form-data` to `{url}/upload`.
///
/// The form carries a `file` part with the raw bytes and a `metadata` part
/// holding `{"username": ..., "folder": ...}` as JSON.
pub struct HttpUploader {
    client: Client,
    config: UploadConfig,
}

impl HttpUploader {
    pub fn new(config: UploadConfig) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| UploadError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Full URL files are posted to.
    pub fn endpoint(&self) -> String {
        format!("{}/upload", self.config.url.trim_end_matches('/'))
    }

    fn build_form(request: &UploadRequest) -> Result<multipart::Form, UploadError> {
        let file_part = multipart::Part::bytes(request.content.to_vec())
            .file_name(request.file_name.clone())
            .mime_str(&request.content_type)
            .map_err(|e| UploadError::InvalidRequest(e.to_string()))?;

        let metadata = serde_json::to_string(&request.metadata)
            .map_err(|e| UploadError::InvalidRequest(e.to_string()))?;

        Ok(multipart::Form::new()
            .part("file", file_part)
            .text("metadata", metadata))
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    fn name(&self) -> &str {
        "http"
    }

    async fn upload(&self, request: UploadRequest) -> Result<UploadReceipt, UploadError> {
        let form = Self::build_form(&request)?;

        debug!(
            file_id = %request.file_id,
            name = %request.file_name,
            content_type = %request.content_type,
            size = request.content.len(),
            username = %request.metadata.username,
            folder = %request.metadata.folder,
            "Uploading file"
        );

        let response = self
            .client
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(UploadError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        response
            .json::<UploadReceipt>()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))
    }
}
