//! Upload orchestrator implementation.
//!
//! Owns one user's staging area and drives batches through the uploader:
//! strictly sequential, one submission in flight at a time.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::preview::PreviewStore;
use crate::staging::{FileId, FileStatus, SelectedFile, StagedFile, StagedFileView, StagingArea};
use crate::uploader::{UploadRequest, Uploader};

use super::batch::{PendingBatch, SessionState};
use super::types::{
    aggregate_progress, BatchRejected, BatchReport, FailedUpload, UploadEvent, UploaderSnapshot,
};

/// Buffer size for the progress event channel
const EVENT_BUFFER_SIZE: usize = 64;

/// Callback invoked after every batch with the successfully uploaded paths.
pub type UploadCompleteCallback = Arc<dyn Fn(&[String]) + Send + Sync>;

/// Stages files for one user and uploads them in batches.
pub struct UploadOrchestrator {
    username: String,
    uploader: Arc<dyn Uploader>,
    /// Staging area, in-progress flag and event channel; shared with the running batch.
    session: Arc<SessionState>,
    on_complete: Option<UploadCompleteCallback>,
    progress: AtomicU8,
}

impl UploadOrchestrator {
    /// Create an orchestrator with `default_folder` as the initial active folder.
    pub fn new(
        username: impl Into<String>,
        default_folder: impl Into<String>,
        uploader: Arc<dyn Uploader>,
        previews: PreviewStore,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER_SIZE);

        Self {
            username: username.into(),
            uploader,
            session: Arc::new(SessionState::new(
                StagingArea::new(default_folder, previews),
                events,
            )),
            on_complete: None,
            progress: AtomicU8::new(0),
        }
    }

    /// Set the callback run when a batch completes.
    pub fn with_completion_callback(mut self, callback: UploadCompleteCallback) -> Self {
        self.on_complete = Some(callback);
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether a batch is currently running.
    pub fn is_uploading(&self) -> bool {
        self.session.uploading.load(Ordering::SeqCst)
    }

    /// Aggregate progress of the current (or last) batch.
    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::SeqCst)
    }

    /// Subscribe to batch progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<UploadEvent> {
        self.session.events.subscribe()
    }

    /// No batch running, nothing staged and no folder beyond the default.
    pub async fn is_idle_and_empty(&self) -> bool {
        let area = self.session.area.read().await;
        !self.is_uploading() && area.is_empty() && area.folders().names().len() == 1
    }

    /// Stage files into the active folder. Returns the new ids in order.
    pub async fn stage(&self, files: Vec<SelectedFile>) -> Vec<FileId> {
        if files.is_empty() {
            return Vec::new();
        }
        let ids = self.session.area.write().await.stage(files);
        info!(username = %self.username, count = ids.len(), "Staged files");
        ids
    }

    /// Remove a staged file and release its preview. No-op for unknown ids.
    pub async fn remove(&self, id: FileId) -> bool {
        self.session.area.write().await.remove(id)
    }

    /// Add a folder and make it active. Blank or duplicate names are ignored.
    pub async fn create_folder(&self, name: &str) -> bool {
        let created = self.session.area.write().await.create_folder(name);
        if created {
            info!(username = %self.username, folder = %name, "Created folder");
        }
        created
    }

    /// Make an existing folder the destination for newly staged files.
    pub async fn select_folder(&self, name: &str) -> bool {
        self.session.area.write().await.select_folder(name)
    }

    pub async fn file(&self, id: FileId) -> Option<StagedFileView> {
        self.session.area.read().await.get(id).map(StagedFile::view)
    }

    /// Current display state.
    pub async fn snapshot(&self) -> UploaderSnapshot {
        let area = self.session.area.read().await;
        UploaderSnapshot {
            username: self.username.clone(),
            files: area.files().iter().map(StagedFile::view).collect(),
            folders: area.folders().names().to_vec(),
            active_folder: area.folders().active().to_string(),
            uploading: self.is_uploading(),
            progress: self.progress(),
        }
    }

    /// Upload every pending file, one after another.
    ///
    /// Returns `None` without touching any state when a batch is already
    /// running or nothing is pending. Dropping the returned future part way
    /// fails the files not yet finished and frees the session.
    pub async fn upload_all(&self) -> Option<BatchReport> {
        match self.begin_batch().await {
            Ok(batch) => Some(self.run_batch(batch).await),
            Err(reason) => {
                debug!(username = %self.username, reason = %reason, "Upload request ignored");
                None
            }
        }
    }

    /// Claim the in-progress flag and queue every pending file.
    pub async fn begin_batch(&self) -> Result<PendingBatch, BatchRejected> {
        // Flag is claimed under the lock: no await between claiming it and
        // handing ownership to the returned batch.
        let mut area = self.session.area.write().await;
        if self.session.uploading.swap(true, Ordering::SeqCst) {
            return Err(BatchRejected::AlreadyRunning);
        }

        let requests: Vec<UploadRequest> = area
            .files_mut()
            .iter_mut()
            .filter(|f| f.status == FileStatus::Pending)
            .map(|f| {
                f.status = FileStatus::Queued;
                UploadRequest::for_staged(f, &self.username)
            })
            .collect();
        drop(area);

        if requests.is_empty() {
            self.session.uploading.store(false, Ordering::SeqCst);
            return Err(BatchRejected::NothingPending);
        }

        self.progress.store(0, Ordering::SeqCst);
        let _ = self.session.events.send(UploadEvent::BatchStarted {
            total: requests.len(),
        });
        info!(username = %self.username, total = requests.len(), "Upload batch started");

        Ok(PendingBatch::new(
            Arc::clone(&self.session),
            &self.username,
            requests,
        ))
    }

    /// Submit the files of a started batch in order and release the flag.
    ///
    /// A failed file never stops the batch. Files removed while the batch runs
    /// are still submitted, but their outcome is not written back.
    pub async fn run_batch(&self, mut batch: PendingBatch) -> BatchReport {
        let requests = batch.take_requests();
        let total = requests.len();
        let mut report = BatchReport {
            total,
            ..Default::default()
        };

        for (idx, request) in requests.into_iter().enumerate() {
            let file_id = request.file_id;
            let file_name = request.file_name.clone();

            self.update_file(file_id, |f| f.status = FileStatus::Uploading)
                .await;
            let _ = self.session.events.send(UploadEvent::FileStarted { file_id });

            let status = match self.uploader.upload(request).await {
                Ok(receipt) => {
                    debug!(file_id = %file_id, path = %receipt.path, "File uploaded");
                    let path = receipt.path.clone();
                    self.update_file(file_id, move |f| {
                        f.status = FileStatus::Success;
                        f.progress = 100;
                        f.uploaded_path = Some(path);
                        f.error = None;
                    })
                    .await;
                    batch.record_success();
                    report.uploaded_paths.push(receipt.path);
                    FileStatus::Success
                }
                Err(e) => {
                    warn!(
                        username = %self.username,
                        file_id = %file_id,
                        name = %file_name,
                        kind = e.kind(),
                        network = e.is_network(),
                        error = %e,
                        "Error uploading file"
                    );
                    let message = e.to_string();
                    self.update_file(file_id, |f| {
                        f.status = FileStatus::Error;
                        f.error = Some(message.clone());
                    })
                    .await;
                    report.failures.push(FailedUpload {
                        file_id,
                        file_name,
                        error: message,
                        kind: e.kind().to_string(),
                    });
                    FileStatus::Error
                }
            };

            // Failed files count towards progress exactly like successful ones.
            let progress = aggregate_progress(idx + 1, total);
            self.progress.store(progress, Ordering::SeqCst);
            let _ = self.session.events.send(UploadEvent::FileFinished {
                file_id,
                status,
                progress,
            });
        }

        batch.finish();
        let _ = self.session.events.send(UploadEvent::BatchFinished {
            uploaded: report.uploaded_paths.len(),
            failed: report.failures.len(),
        });
        info!(
            username = %self.username,
            uploaded = report.uploaded_paths.len(),
            failed = report.failures.len(),
            "Upload batch finished"
        );

        if let Some(callback) = &self.on_complete {
            callback(&report.uploaded_paths);
        }

        report
    }

    async fn update_file<F>(&self, id: FileId, update: F)
    where
        F: FnOnce(&mut StagedFile),
    {
        let mut area = self.session.area.write().await;
        match area.get_mut(id) {
            Some(file) => update(file),
            None => debug!(file_id = %id, "File removed during upload, result dropped"),
        }
    }
}
