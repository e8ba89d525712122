//! WebSocket push channel for viewers.
//!
//! Connection lifecycle: upgrade → register with the hub (which queues the
//! current snapshot as the first message) → forward hub events until the
//! socket closes or the hub prunes us, then unregister.

use std::sync::Arc;

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::state::AppState;

pub mod events;

/// GET /ws - WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (id, mut rx) = state.hub.subscribe();
    info!(subscriber = %id, "viewer connected");

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => {
                // None means the broadcaster already pruned this subscriber.
                let Some(event) = event else { break };
                match serde_json::to_string(&event) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(subscriber = %id, error = %e, "event serialization failed"),
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    // The protocol carries no viewer-to-server semantics;
                    // accept and ignore anything else.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(subscriber = %id, error = %e, "websocket read error");
                        break;
                    }
                }
            }
        }
    }

    state.hub.unsubscribe(id);
    info!(subscriber = %id, "viewer disconnected");
}
