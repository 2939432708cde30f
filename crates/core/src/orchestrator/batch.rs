//! Batch ownership.
//!
//! A started batch owns the session's in-progress flag. Dropping it before
//! `UploadOrchestrator::run_batch` completes (cancelled future, timeout,
//! panic, never run) releases the flag and fails every file it still holds.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, RwLock};
use tracing::warn;

use crate::staging::{FileId, FileStatus, StagingArea};
use crate::uploader::UploadRequest;

use super::types::UploadEvent;

/// Error recorded on files whose batch stopped before reaching them.
pub const BATCH_ABANDONED_ERROR: &str = "Upload cancelled before completion";

/// State shared between an orchestrator and its running batch.
pub(crate) struct SessionState {
    pub(crate) area: RwLock<StagingArea>,
    pub(crate) uploading: AtomicBool,
    pub(crate) events: broadcast::Sender<UploadEvent>,
}

impl SessionState {
    pub(crate) fn new(area: StagingArea, events: broadcast::Sender<UploadEvent>) -> Self {
        Self {
            area: RwLock::new(area),
            uploading: AtomicBool::new(false),
            events,
        }
    }

    /// Fail the batch files that never finished, then release the flag.
    fn abandon(&self, area: &mut StagingArea, username: &str, ids: &[FileId], uploaded: usize) {
        let mut cancelled = 0;
        for id in ids {
            if let Some(file) = area.get_mut(*id) {
                if !file.status.is_terminal() {
                    file.status = FileStatus::Error;
                    file.error = Some(BATCH_ABANDONED_ERROR.to_string());
                    cancelled += 1;
                }
            }
        }

        self.uploading.store(false, Ordering::SeqCst);
        let _ = self.events.send(UploadEvent::BatchFinished {
            uploaded,
            failed: ids.len().saturating_sub(uploaded),
        });
        warn!(username = %username, cancelled, "Upload batch abandoned");
    }
}

/// A batch that has claimed the in-progress flag and marked its files queued.
///
/// Hand it to `UploadOrchestrator::run_batch`. Dropping it unfinished fails
/// the files it still holds and frees the session for the next batch.
#[must_use = "a started batch holds the in-progress flag until it is run or dropped"]
pub struct PendingBatch {
    requests: Vec<UploadRequest>,
    file_ids: Vec<FileId>,
    username: String,
    uploaded: usize,
    finished: bool,
    session: Arc<SessionState>,
}

impl PendingBatch {
    pub(crate) fn new(
        session: Arc<SessionState>,
        username: &str,
        requests: Vec<UploadRequest>,
    ) -> Self {
        let file_ids = requests.iter().map(|r| r.file_id).collect();
        Self {
            requests,
            file_ids,
            username: username.to_string(),
            uploaded: 0,
            finished: false,
            session,
        }
    }

    pub fn len(&self) -> usize {
        self.file_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_ids.is_empty()
    }

    /// Files in submission order.
    pub fn file_ids(&self) -> Vec<FileId> {
        self.file_ids.clone()
    }

    pub(crate) fn take_requests(&mut self) -> Vec<UploadRequest> {
        std::mem::take(&mut self.requests)
    }

    pub(crate) fn record_success(&mut self) {
        self.uploaded += 1;
    }

    /// Mark the batch as run to completion and release the flag.
    pub(crate) fn finish(mut self) {
        self.finished = true;
        self.session.uploading.store(false, Ordering::SeqCst);
    }
}

impl fmt::Debug for PendingBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingBatch")
            .field("username", &self.username)
            .field("file_ids", &self.file_ids)
            .field("uploaded", &self.uploaded)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl Drop for PendingBatch {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let session = Arc::clone(&self.session);
        let username = std::mem::take(&mut self.username);
        let ids = std::mem::take(&mut self.file_ids);
        let uploaded = self.uploaded;

        if let Ok(mut area) = session.area.try_write() {
            session.abandon(&mut area, &username, &ids, uploaded);
            return;
        }

        // Lock is busy: finish the cleanup once it frees up.
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let mut area = session.area.write().await;
                    session.abandon(&mut area, &username, &ids, uploaded);
                });
            }
            Err(_) => {
                session.uploading.store(false, Ordering::SeqCst);
                warn!(username = %username, "Upload batch abandoned outside a runtime");
            }
        }
    }
}
