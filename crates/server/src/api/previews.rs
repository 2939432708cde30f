use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::handlers::error_response;
use crate::state::AppState;

/// Serve the bytes behind a live preview token.
pub async fn get_preview(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Response {
    match state.previews().get(&token) {
        Some(preview) => (
            [
                (header::CONTENT_TYPE, preview.content_type),
                (header::CACHE_CONTROL, "private, no-store".to_string()),
            ],
            preview.data.to_vec(),
        )
            .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Preview not found").into_response(),
    }
}
