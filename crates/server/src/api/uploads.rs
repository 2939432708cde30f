//! Upload session API handlers.
//!
//! Every route is scoped to a username. Only staging and folder creation
//! create a session; it is dropped again once empty.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use photodrop_core::{BatchRejected, FileId, SelectedFile, StagedFileView, UploaderSnapshot};

use super::handlers::{error_response, ErrorResponse};
use crate::metrics::{record_batch, UPLOAD_BATCHES_TOTAL};
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body naming a folder.
#[derive(Debug, Deserialize)]
pub struct FolderBody {
    pub name: String,
}

/// Response for staging files.
#[derive(Debug, Serialize)]
pub struct StagedFilesResponse {
    pub files: Vec<StagedFileView>,
}

/// Folder state after a folder operation.
#[derive(Debug, Serialize)]
pub struct FoldersResponse {
    /// Only set by folder creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    pub folders: Vec<String>,
    pub active_folder: String,
}

impl FoldersResponse {
    fn from_snapshot(snapshot: UploaderSnapshot, created: Option<bool>) -> Self {
        Self {
            created,
            folders: snapshot.folders,
            active_folder: snapshot.active_folder,
        }
    }
}

/// Response for a batch that was started.
#[derive(Debug, Serialize)]
pub struct BatchStartedResponse {
    pub total: usize,
    pub file_ids: Vec<FileId>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Current display state of a session.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Json<UploaderSnapshot> {
    Json(state.snapshot(&username).await)
}

/// Stage every `file` part of a multipart body into the active folder.
pub async fn stage_files(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StagedFilesResponse>), ApiError> {
    let mut selected = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid multipart body: {}", e),
                ));
            }
        };

        let name = field.name().unwrap_or("").to_string();
        if name != "file" {
            debug!(field = %name, "Ignoring multipart field");
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(|s| s.to_string());
        let content = field.bytes().await.map_err(|e| {
            error_response(
                StatusCode::BAD_REQUEST,
                format!("Failed to read file '{}': {}", file_name, e),
            )
        })?;

        let mut file = SelectedFile::new(file_name, content.to_vec());
        if let Some(content_type) = content_type {
            file = file.with_content_type(content_type);
        }
        selected.push(file);
    }

    if selected.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "No file fields in request",
        ));
    }

    let session = state.session(&username).await;
    let ids = session.stage(selected).await;

    let mut files = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(view) = session.file(id).await {
            files.push(view);
        }
    }

    Ok((StatusCode::CREATED, Json(StagedFilesResponse { files })))
}

/// Remove a staged file. Unknown ids are not an error.
pub async fn remove_file(
    State(state): State<Arc<AppState>>,
    Path((username, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let id: FileId = id.parse().map_err(|_| {
        error_response(StatusCode::BAD_REQUEST, format!("Invalid file id: {}", id))
    })?;

    if let Some(session) = state.existing_session(&username).await {
        if session.remove(id).await {
            debug!(username = %username, file_id = %id, "Removed staged file");
        }
        drop(session);
        state.evict_if_idle(&username).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Create a folder and make it active.
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(body): Json<FolderBody>,
) -> Json<FoldersResponse> {
    let session = state.session(&username).await;
    let created = session.create_folder(&body.name).await;
    let response = FoldersResponse::from_snapshot(session.snapshot().await, Some(created));
    if !created {
        drop(session);
        state.evict_if_idle(&username).await;
    }
    Json(response)
}

/// Switch the active folder.
pub async fn select_folder(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(body): Json<FolderBody>,
) -> Result<Json<FoldersResponse>, ApiError> {
    let not_found = || {
        error_response(
            StatusCode::NOT_FOUND,
            format!("Folder not found: {}", body.name),
        )
    };

    // Without a session only the default folder exists, and it is already active.
    let Some(session) = state.existing_session(&username).await else {
        let snapshot = state.default_snapshot(&username);
        if snapshot.active_folder != body.name {
            return Err(not_found());
        }
        return Ok(Json(FoldersResponse::from_snapshot(snapshot, None)));
    };

    if !session.select_folder(&body.name).await {
        return Err(not_found());
    }
    Ok(Json(FoldersResponse::from_snapshot(
        session.snapshot().await,
        None,
    )))
}

/// Start uploading every pending file. The batch runs in the background.
pub async fn start_batch(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<(StatusCode, Json<BatchStartedResponse>), ApiError> {
    let Some(session) = state.existing_session(&username).await else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            BatchRejected::NothingPending.to_string(),
        ));
    };

    let batch = match session.begin_batch().await {
        Ok(batch) => batch,
        Err(reason @ BatchRejected::AlreadyRunning) => {
            return Err(error_response(StatusCode::CONFLICT, reason.to_string()));
        }
        Err(reason @ BatchRejected::NothingPending) => {
            return Err(error_response(StatusCode::BAD_REQUEST, reason.to_string()));
        }
    };

    UPLOAD_BATCHES_TOTAL.inc();
    let response = BatchStartedResponse {
        total: batch.len(),
        file_ids: batch.file_ids(),
    };

    tokio::spawn(async move {
        let report = session.run_batch(batch).await;
        record_batch(&report);
        if report.failures.is_empty() {
            info!(username = %session.username(), total = report.total, "Batch uploaded");
        } else {
            warn!(
                username = %session.username(),
                total = report.total,
                failed = report.failures.len(),
                "Batch finished with failures"
            );
        }
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}
