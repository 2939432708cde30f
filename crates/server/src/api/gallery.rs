//! Gallery proxy handler.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

use super::handlers::{error_response, ErrorResponse};
use crate::metrics::GALLERY_REQUESTS_TOTAL;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GalleryParams {
    pub username: Option<String>,
}

/// Relay a user's gallery listing from the upstream service.
pub async fn get_gallery(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GalleryParams>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorResponse>)> {
    let username = match params.username.as_deref() {
        Some(username) if !username.is_empty() => username,
        _ => {
            GALLERY_REQUESTS_TOTAL
                .with_label_values(&["bad_request"])
                .inc();
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Username is required",
            ));
        }
    };

    let Some(gallery) = state.gallery() else {
        GALLERY_REQUESTS_TOTAL
            .with_label_values(&["unconfigured"])
            .inc();
        return Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Gallery not configured",
        ));
    };

    match gallery.fetch(username).await {
        Ok(listing) => {
            GALLERY_REQUESTS_TOTAL.with_label_values(&["ok"]).inc();
            Ok(Json(listing))
        }
        Err(e) => {
            error!(username = %username, error = %e, "Error fetching gallery");
            GALLERY_REQUESTS_TOTAL.with_label_values(&["error"]).inc();
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch gallery data",
            ))
        }
    }
}
