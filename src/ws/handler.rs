//! WebSocket upgrade handler

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::game::ClientId;
use crate::util::rate_limit::InputRateLimiter;
use crate::ws::hub::{Hub, Inbound, OUTBOX_CAPACITY};
use crate::ws::protocol::{ClientMsg, ServerMsg};

#[derive(Debug, thiserror::Error)]
enum SendError {
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("socket write failed: {0}")]
    Socket(#[from] axum::Error),
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (outbox_tx, outbox_rx) = mpsc::channel(OUTBOX_CAPACITY);

    let client_id = match state.hub.connect(outbox_tx).await {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "Connection refused during handshake");
            return;
        }
    };
    info!(client_id, "New WebSocket connection");

    let (ws_sink, ws_stream) = socket.split();
    run_session(client_id, &state.hub, ws_sink, ws_stream, outbox_rx).await;

    state.hub.disconnect(client_id).await;
    info!(client_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    client_id: ClientId,
    hub: &Hub,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut ws_stream: SplitStream<WebSocket>,
    mut outbox_rx: mpsc::Receiver<Arc<ServerMsg>>,
) {
    let rate_limiter = InputRateLimiter::new();

    // Writer task: session outbox -> WebSocket
    let writer_handle = tokio::spawn(async move {
        while let Some(msg) = outbox_rx.recv().await {
            if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                debug!(client_id, error = %e, "WebSocket send failed");
                break;
            }
        }
        let _ = ws_sink.close().await;
    });

    // Reader loop: WebSocket -> session
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check() {
                    warn!(client_id, "Rate limited input message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(msg) => {
                        if !hub.deliver(Inbound { from: client_id, msg }).await {
                            debug!(client_id, "Session inbox closed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(client_id, error = %e, "Failed to parse client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(client_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(client_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(client_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), SendError> {
    let json = serde_json::to_string(msg)?;
    sink.send(Message::Text(json)).await?;
    Ok(())
}
