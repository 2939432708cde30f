//! Types for the upload orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::staging::{FileId, FileStatus, StagedFileView};

/// Why a batch could not be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BatchRejected {
    /// Another batch is still running.
    #[error("an upload batch is already in progress")]
    AlreadyRunning,

    /// No staged file is waiting to be uploaded.
    #[error("no pending files to upload")]
    NothingPending,
}

/// A file that failed during a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedUpload {
    pub file_id: FileId,
    pub file_name: String,
    pub error: String,
    /// Short failure label, see `UploadError::kind`.
    pub kind: String,
}

/// Outcome of one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Files submitted.
    pub total: usize,
    /// Paths returned by the server, in submission order.
    pub uploaded_paths: Vec<String>,
    /// Files that failed, in submission order.
    pub failures: Vec<FailedUpload>,
}

/// Progress notifications published while a batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UploadEvent {
    BatchStarted {
        total: usize,
    },
    FileStarted {
        file_id: FileId,
    },
    FileFinished {
        file_id: FileId,
        status: FileStatus,
        /// Aggregate batch progress after this file, 0-100.
        progress: u8,
    },
    BatchFinished {
        uploaded: usize,
        failed: usize,
    },
}

/// Display state of one upload session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploaderSnapshot {
    pub username: String,
    pub files: Vec<StagedFileView>,
    pub folders: Vec<String>,
    pub active_folder: String,
    pub uploading: bool,
    /// Aggregate progress of the current (or last) batch, 0-100.
    pub progress: u8,
}

/// `round(completed / total * 100)`, with halves rounded up.
pub fn aggregate_progress(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    ((completed * 200 + total) / (2 * total)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_progress() {
        assert_eq!(aggregate_progress(0, 4), 0);
        assert_eq!(aggregate_progress(1, 2), 50);
        assert_eq!(aggregate_progress(2, 2), 100);
        assert_eq!(aggregate_progress(1, 3), 33);
        assert_eq!(aggregate_progress(2, 3), 67);
        assert_eq!(aggregate_progress(1, 8), 13); // 12.5 rounds up
        assert_eq!(aggregate_progress(0, 0), 0);
    }

    #[test]
    fn test_event_serialization() {
        let event = UploadEvent::FileFinished {
            file_id: "7".parse().unwrap(),
            status: FileStatus::Success,
            progress: 50,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "file_finished");
        assert_eq!(json["file_id"], 7);
        assert_eq!(json["status"], "success");
        assert_eq!(json["progress"], 50);
    }

    #[test]
    fn test_batch_rejected_display() {
        assert_eq!(
            BatchRejected::AlreadyRunning.to_string(),
            "an upload batch is already in progress"
        );
    }
}
