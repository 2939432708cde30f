//! WebSocket stream of a session's upload progress.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use photodrop_core::{UploadEvent, UploadOrchestrator};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// WebSocket upgrade handler.
pub async fn events_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    let session = state.session(&username).await;
    // Subscribe before answering so no event after the handshake is missed.
    let rx = session.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, state, session, rx))
}

fn event_type(event: &UploadEvent) -> &'static str {
    match event {
        UploadEvent::BatchStarted { .. } => "batch_started",
        UploadEvent::FileStarted { .. } => "file_started",
        UploadEvent::FileFinished { .. } => "file_finished",
        UploadEvent::BatchFinished { .. } => "batch_finished",
    }
}

/// Handle a single WebSocket connection.
async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    session: Arc<UploadOrchestrator>,
    mut rx: broadcast::Receiver<UploadEvent>,
) {
    let (mut sender, mut receiver) = socket.split();
    let username = session.username().to_string();

    WS_CONNECTIONS_ACTIVE.inc();
    info!(username = %username, "WebSocket client connected");

    // Forward session events to this client
    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    WS_MESSAGES_SENT
                        .with_label_values(&[event_type(&event)])
                        .inc();

                    match serde_json::to_string(&event) {
                        Ok(json) => {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                debug!("WebSocket send failed, client disconnected");
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Failed to serialize UploadEvent: {}", e);
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("WebSocket client lagged, skipped {} events", n);
                    WS_LAG_EVENTS.inc();
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event channel closed");
                    break;
                }
            }
        }
    });

    // Clients only ever close; anything else is ignored
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!(username = %username, "WebSocket client disconnected");

    // A watcher that never staged anything leaves no session behind.
    drop(session);
    state.evict_if_idle(&username).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use photodrop_core::{FileId, FileStatus};

    #[test]
    fn test_event_type_labels() {
        let id: FileId = "1".parse().unwrap();
        assert_eq!(
            event_type(&UploadEvent::BatchStarted { total: 2 }),
            "batch_started"
        );
        assert_eq!(
            event_type(&UploadEvent::FileStarted { file_id: id }),
            "file_started"
        );
        assert_eq!(
            event_type(&UploadEvent::FileFinished {
                file_id: id,
                status: FileStatus::Error,
                progress: 50,
            }),
            "file_finished"
        );
        assert_eq!(
            event_type(&UploadEvent::BatchFinished {
                uploaded: 1,
                failed: 1
            }),
            "batch_finished"
        );
    }
}
