use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::{gallery, handlers, middleware::metrics_middleware, previews, uploads, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_body_bytes();

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Gallery proxy
        .route("/gallery", get(gallery::get_gallery))
        // Upload sessions
        .route("/uploads/{username}", get(uploads::get_session))
        .route("/uploads/{username}/files", post(uploads::stage_files))
        .route("/uploads/{username}/files/{id}", delete(uploads::remove_file))
        .route("/uploads/{username}/folders", post(uploads::create_folder))
        .route("/uploads/{username}/folders/active", put(uploads::select_folder))
        .route("/uploads/{username}/start", post(uploads::start_batch))
        .route("/uploads/{username}/events", get(ws::events_handler))
        // Previews
        .route("/previews/{token}", get(previews::get_preview))
        .with_state(Arc::clone(&state));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
