//! Types for staged files.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::preview::PreviewHandle;

/// Content type used when the selection carries none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a staged file.
///
/// Allocated from a process-wide counter, so two files with the same name
/// staged in the same instant still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(u64);

impl FileId {
    /// Allocate the next id.
    pub fn next() -> Self {
        Self(NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Upload status of a staged file.
///
/// `Pending -> Queued -> Uploading -> {Success, Error}`. Terminal states are
/// only left by removing the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Staged, not part of any batch yet.
    Pending,
    /// Part of the running batch, waiting for its turn.
    Queued,
    /// Submission in flight.
    Uploading,
    Success,
    Error,
}

impl FileStatus {
    /// Whether a batch is done with the file.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Queued => "queued",
            Self::Uploading => "uploading",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw file selection, before staging.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            content: content.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// A file in the staging collection.
#[derive(Debug)]
pub struct StagedFile {
    pub id: FileId,
    pub name: String,
    pub content_type: String,
    pub content: Arc<[u8]>,
    pub preview: PreviewHandle,
    /// Destination folder, bound when the file was staged.
    pub folder: String,
    pub status: FileStatus,
    /// 0 until the file uploads successfully, then 100.
    pub progress: u8,
    pub staged_at: DateTime<Utc>,
    pub uploaded_path: Option<String>,
    pub error: Option<String>,
}

impl StagedFile {
    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }

    /// Content-free view of this file for display.
    pub fn view(&self) -> StagedFileView {
        StagedFileView {
            id: self.id,
            name: self.name.clone(),
            size_bytes: self.size_bytes(),
            content_type: self.content_type.clone(),
            folder: self.folder.clone(),
            status: self.status,
            progress: self.progress,
            preview_token: self.preview.token().to_string(),
            staged_at: self.staged_at,
            uploaded_path: self.uploaded_path.clone(),
            error: self.error.clone(),
        }
    }
}

/// Serializable view of a staged file (no content).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedFileView {
    pub id: FileId,
    pub name: String,
    pub size_bytes: u64,
    pub content_type: String,
    pub folder: String,
    pub status: FileStatus,
    pub progress: u8,
    pub preview_token: String,
    pub staged_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
