//! Types for the uploader module.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::staging::{FileId, StagedFile};

/// Metadata sent alongside the file, JSON-encoded in the `metadata` part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub username: String,
    pub folder: String,
}

/// A single file submission.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Staged file this submission belongs to (for tracking).
    pub file_id: FileId,
    pub file_name: String,
    pub content_type: String,
    pub content: Arc<[u8]>,
    pub metadata: UploadMetadata,
}

impl UploadRequest {
    /// Build the submission for a staged file.
    pub fn for_staged(file: &StagedFile, username: &str) -> Self {
        Self {
            file_id: file.id,
            file_name: file.name.clone(),
            content_type: file.content_type.clone(),
            content: Arc::clone(&file.content),
            metadata: UploadMetadata {
                username: username.to_string(),
                folder: file.folder.clone(),
            },
        }
    }
}

/// Successful upload, as reported by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Where the server stored the file.
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_json_shape() {
        let metadata = UploadMetadata {
            username: "alice".to_string(),
            folder: "folder_1".to_string(),
        };
        let json: serde_json::Value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"username": "alice", "folder": "folder_1"})
        );
    }

    #[test]
    fn test_receipt_ignores_extra_fields() {
        let receipt: UploadReceipt =
            serde_json::from_str(r#"{"path": "/a.jpg", "size": 12, "ok": true}"#).unwrap();
        assert_eq!(receipt.path, "/a.jpg");
    }

    #[test]
    fn test_receipt_requires_path() {
        let result: Result<UploadReceipt, _> = serde_json::from_str(r#"{"ok": true}"#);
        assert!(result.is_err());
    }
}
