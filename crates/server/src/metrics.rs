//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the photodrop server:
//! - HTTP request metrics (latency, counts)
//! - Upload batch and per-file outcomes
//! - Gallery proxy outcomes
//! - WebSocket connections
//! - Upload sessions and live previews (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

use photodrop_core::BatchReport;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "photodrop_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("photodrop_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "photodrop_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Upload Metrics
// =============================================================================

/// Upload batches started.
pub static UPLOAD_BATCHES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "photodrop_upload_batches_total",
        "Total upload batches started since startup",
    )
    .unwrap()
});

/// Uploaded files by outcome.
pub static UPLOAD_FILES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("photodrop_upload_files_total", "Files submitted by outcome (success or failure kind)"),
        &["outcome"],
    )
    .unwrap()
});

/// Upload sessions currently held in memory (collected dynamically).
pub static UPLOAD_SESSIONS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "photodrop_upload_sessions",
        "Number of upload sessions held in memory",
    )
    .unwrap()
});

/// Live previews (collected dynamically).
pub static PREVIEWS_LIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("photodrop_previews_live", "Number of live file previews").unwrap()
});

// =============================================================================
// Gallery Metrics
// =============================================================================

/// Gallery proxy requests by outcome.
pub static GALLERY_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "photodrop_gallery_requests_total",
            "Gallery proxy requests by outcome",
        ),
        &["outcome"],
    )
    .unwrap()
});

// =============================================================================
// WebSocket Metrics
// =============================================================================

/// Currently open WebSocket connections.
pub static WS_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "photodrop_ws_connections_active",
        "Number of active WebSocket connections",
    )
    .unwrap()
});

/// WebSocket messages sent by event type.
pub static WS_MESSAGES_SENT: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "photodrop_ws_messages_sent_total",
            "WebSocket messages sent by event type",
        ),
        &["event"],
    )
    .unwrap()
});

/// Times a WebSocket client fell behind the event channel.
pub static WS_LAG_EVENTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "photodrop_ws_lag_events_total",
        "Times a WebSocket client lagged behind and skipped events",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Uploads
    registry
        .register(Box::new(UPLOAD_BATCHES_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(UPLOAD_FILES_TOTAL.clone()))
        .unwrap();
    registry.register(Box::new(UPLOAD_SESSIONS.clone())).unwrap();
    registry.register(Box::new(PREVIEWS_LIVE.clone())).unwrap();

    // Gallery
    registry
        .register(Box::new(GALLERY_REQUESTS_TOTAL.clone()))
        .unwrap();

    // WebSocket
    registry
        .register(Box::new(WS_CONNECTIONS_ACTIVE.clone()))
        .unwrap();
    registry.register(Box::new(WS_MESSAGES_SENT.clone())).unwrap();
    registry.register(Box::new(WS_LAG_EVENTS.clone())).unwrap();
}

/// Record the outcome of a finished batch. Failures are labelled by kind.
pub fn record_batch(report: &BatchReport) {
    UPLOAD_FILES_TOTAL
        .with_label_values(&["success"])
        .inc_by(report.uploaded_paths.len() as u64);
    for failure in &report.failures {
        UPLOAD_FILES_TOTAL
            .with_label_values(&[failure.kind.as_str()])
            .inc();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Collect dynamic metrics from current application state.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    UPLOAD_SESSIONS.set(state.session_count().await as i64);
    PREVIEWS_LIVE.set(state.previews().len() as i64);
}

/// Normalize a path for metric labels (replace usernames, ids and tokens).
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = path.split('/').collect();
    let mut i = 0;
    while i < segments.len() {
        let placeholder = match segments[i] {
            "uploads" => Some("{username}"),
            "files" => Some("{id}"),
            "previews" => Some("{token}"),
            _ => None,
        };
        if let Some(placeholder) = placeholder {
            if let Some(next) = segments.get_mut(i + 1) {
                if !next.is_empty() {
                    *next = placeholder;
                    i += 1;
                }
            }
        }
        i += 1;
    }
    segments.join("/")
}
