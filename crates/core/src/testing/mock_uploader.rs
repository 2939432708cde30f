//! Mock uploader for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::uploader::{UploadError, UploadReceipt, UploadRequest, Uploader};

/// A recorded submission for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    /// The request that was submitted.
    pub request: UploadRequest,
    /// Whether the submission succeeded.
    pub success: bool,
}

/// Mock implementation of the Uploader trait.
///
/// Provides controllable behavior for testing:
/// - Script per-call outcomes (consumed in order)
/// - Track submitted requests for assertions
/// - Simulate upload latency
/// - Track how many submissions overlap
///
/// Calls without a scripted outcome succeed with
/// `/uploads/{username}/{folder}/{file_name}`.
///
/// # Example
///
/// ```rust,ignore
/// use photodrop_core::testing::MockUploader;
///
/// let uploader = MockUploader::new();
/// uploader.push_success("/a.jpg").await;
/// uploader.push_failure(UploadError::Timeout).await;
///
/// // Hand it to an orchestrator...
/// assert_eq!(uploader.request_count().await, 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockUploader {
    /// Outcomes returned by upcoming calls.
    outcomes: Arc<RwLock<VecDeque<Result<UploadReceipt, UploadError>>>>,
    /// Recorded submissions.
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    /// Simulated upload duration in milliseconds.
    upload_duration_ms: Arc<RwLock<u64>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockUploader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUploader {
    /// Create a new mock uploader.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(RwLock::new(VecDeque::new())),
            uploads: Arc::new(RwLock::new(Vec::new())),
            upload_duration_ms: Arc::new(RwLock::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make the next unscripted call succeed with `path`.
    pub async fn push_success(&self, path: &str) {
        self.outcomes.write().await.push_back(Ok(UploadReceipt {
            path: path.to_string(),
        }));
    }

    /// Make the next unscripted call fail with `error`.
    pub async fn push_failure(&self, error: UploadError) {
        self.outcomes.write().await.push_back(Err(error));
    }

    /// Set the simulated upload duration.
    pub async fn set_upload_duration(&self, duration: Duration) {
        *self.upload_duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Get all recorded submissions.
    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    /// Get the submitted requests, in order.
    pub async fn recorded_requests(&self) -> Vec<UploadRequest> {
        self.uploads
            .read()
            .await
            .iter()
            .map(|u| u.request.clone())
            .collect()
    }

    /// Get the number of submissions performed.
    pub async fn request_count(&self) -> usize {
        self.uploads.read().await.len()
    }

    /// Highest number of submissions that were in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Uploader for MockUploader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload(&self, request: UploadRequest) -> Result<UploadReceipt, UploadError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let duration_ms = *self.upload_duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        let outcome = self
            .outcomes
            .write()
            .await
            .pop_front()
            .unwrap_or_else(|| {
                Ok(UploadReceipt {
                    path: format!(
                        "/uploads/{}/{}/{}",
                        request.metadata.username, request.metadata.folder, request.file_name
                    ),
                })
            });

        self.uploads.write().await.push(RecordedUpload {
            request,
            success: outcome.is_ok(),
        });
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        outcome
    }
}
