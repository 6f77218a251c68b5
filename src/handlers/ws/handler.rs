//! Axum WebSocket handler
//!
//! Upgrades the HTTP connection and runs the per-connection session: a
//! writer task drains the bounded outbound queue while the read loop feeds
//! events to the processor. Any exit path ends in `remove_connection`, so
//! channel membership never outlives the socket.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::rooms::SEND_QUEUE_CAPACITY;
use crate::state::AppState;

use super::{
    messages::{ClientEvent, ServerEvent},
    processor::handle_client_event,
    state::ConnectionState,
};

/// WebSocket upgrade endpoint
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Run one WebSocket connection to completion
async fn handle_socket(socket: WebSocket, app: Arc<AppState>) {
    let conn_id = uuid::Uuid::new_v4();
    info!(conn = %conn_id, "WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let (event_tx, mut event_rx) = mpsc::channel::<ServerEvent>(SEND_QUEUE_CAPACITY);
    app.rooms.register(conn_id, event_tx.clone());

    // Writer task: serialize and send outbound events. Exits when the
    // registry drops the sender or the socket errors.
    let sender_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize outgoing event: {}", e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(json.into())).await {
                debug!("Failed to send WebSocket message: {}", e);
                break;
            }
        }
    });

    let mut conn_state = ConnectionState::new(conn_id);

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let event: ClientEvent = match serde_json::from_str(&text) {
                    Ok(event) => event,
                    Err(e) => {
                        debug!(conn = %conn_id, "Failed to parse incoming event: {}", e);
                        let _ = event_tx
                            .send(ServerEvent::Error {
                                message: format!("Invalid message format: {e}"),
                            })
                            .await;
                        continue;
                    }
                };
                handle_client_event(event, &mut conn_state, &event_tx, &app).await;
            }
            Ok(Message::Close(_)) => {
                info!(conn = %conn_id, "WebSocket connection closed by client");
                break;
            }
            // Ping/pong replies are handled by axum.
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Binary(_)) => {
                debug!(conn = %conn_id, "binary message ignored");
            }
            Err(e) => {
                warn!(conn = %conn_id, "WebSocket error: {}", e);
                break;
            }
        }
    }

    // Membership cleanup only. Acknowledged queue mutations stay in place;
    // a disconnected patient keeps their spot in line.
    app.rooms.remove_connection(conn_id);
    sender_task.abort();
    info!(conn = %conn_id, "WebSocket connection terminated");
}
