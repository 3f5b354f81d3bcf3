//! WebSocket connection handlers.
//!
//! One reader and one writer task per socket. The reader parses frames into
//! [`ClientEvent`]s and forwards them to the coordinator; the writer drains the
//! connection's outbound channel. When either side stops, the other is aborted
//! and the coordinator is told the connection is gone.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::ConnectionIdFactory,
    infrastructure::{broadcast::Outbound, dto::websocket::ClientEvent},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionIdFactory::generate();

    // Create a channel for the coordinator to write to this client
    let (tx, mut rx) = mpsc::unbounded_channel();
    if let Err(e) = state.coordinator.connect(connection_id.clone(), tx) {
        tracing::error!("Cannot accept connection '{}': {}", connection_id, e);
        return;
    }
    tracing::info!("Client '{}' connected", connection_id);

    let (mut sender, mut receiver) = socket.split();

    // Spawn a task to write queued events to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame {
                Outbound::Text(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // Spawn a task to receive events from this client
    let coordinator = state.coordinator.clone();
    let reader_id = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error on '{}': {}", reader_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let event = match serde_json::from_str::<ClientEvent>(text.as_str()) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!("Dropping malformed frame from '{}': {}", reader_id, e);
                            continue;
                        }
                    };
                    tracing::debug!("Received {:?} from '{}'", event, reader_id);
                    if coordinator.dispatch(reader_id.clone(), event).is_err() {
                        break;
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", reader_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if let Err(e) = state.coordinator.disconnect(connection_id.clone()) {
        tracing::debug!("Disconnect of '{}' not delivered: {}", connection_id, e);
    }
    tracing::info!("Client '{}' disconnected", connection_id);
}
