//! WebSocket endpoint.
//!
//! A socket is an observer that can also draft. Draft events are pushed as
//! JSON text frames; client `draft` frames go through the same
//! [`DraftRoom`](huddle_core::DraftRoom) as the HTTP endpoint.

use crate::handlers::AppState;
use crate::metrics::{self, ConnectionMetricsGuard};
use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use huddle_protocol::{codec, ClientFrame, ProtocolError, ServerFrame};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.max_message_size(state.config.limits.max_body_bytes)
        .on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_websocket(socket: WebSocket, state: Arc<AppState>) {
    let _metrics_guard = ConnectionMetricsGuard::new("websocket");

    let mut subscription = state.room.subscribe();
    let observer = subscription.id();
    debug!(observer = %observer, "WebSocket observer connected");

    let (mut sender, mut receiver) = socket.split();

    let connected = ServerFrame::connected(observer.as_u64(), state.config.stream.retry_ms);
    if let Err(e) = send_frame(&mut sender, &connected).await {
        debug!(observer = %observer, error = %e, "Failed to send Connected frame");
        return;
    }

    loop {
        tokio::select! {
            biased;

            // Draft events from the hub
            event = subscription.recv() => {
                let Some(event) = event else {
                    debug!(observer = %observer, "Observer dropped by hub");
                    break;
                };
                let frame = ServerFrame::draft(event.player_id, event.sequence);
                if send_frame(&mut sender, &frame).await.is_err() {
                    break;
                }
            }

            // Client frames
            msg = receiver.next() => {
                let reply = match msg {
                    Some(Ok(Message::Text(text))) => handle_frame(text.as_bytes(), &state),
                    Some(Ok(Message::Binary(data))) => handle_frame(&data, &state),
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                        continue;
                    }
                    Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) => {
                        debug!(observer = %observer, "Received close frame");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(observer = %observer, error = %e, "WebSocket error");
                        metrics::record_error("websocket");
                        break;
                    }
                    None => {
                        debug!(observer = %observer, "WebSocket stream ended");
                        break;
                    }
                };

                if send_frame(&mut sender, &reply).await.is_err() {
                    break;
                }
            }
        }
    }

    state.room.unsubscribe(observer);
    debug!(observer = %observer, "WebSocket observer disconnected");
}

/// Decode and act on one client frame, returning the reply.
fn handle_frame(data: &[u8], state: &AppState) -> ServerFrame {
    let frame: ClientFrame = match codec::decode(data) {
        Ok(frame) => frame,
        Err(e) => return decode_error(&e),
    };

    match frame {
        ClientFrame::Draft { id, player_id } => match state.room.draft(player_id) {
            Ok(drafted) => {
                metrics::record_draft(&drafted.report);
                info!(
                    player = player_id,
                    sequence = drafted.event.sequence,
                    delivered = drafted.report.delivered,
                    "Player drafted over WebSocket"
                );
                ServerFrame::ack(id)
            }
            Err(e) => {
                metrics::record_declined(e.reason());
                ServerFrame::declined(id, e.to_string())
            }
        },
        ClientFrame::Ping => ServerFrame::Pong,
    }
}

fn decode_error(error: &ProtocolError) -> ServerFrame {
    debug!(error = %error, "Undecodable client frame");
    metrics::record_error("decode");
    ServerFrame::error(error.to_string())
}

/// Send a frame to the WebSocket.
async fn send_frame(
    sender: &mut SplitSink<WebSocket, Message>,
    frame: &ServerFrame,
) -> Result<()> {
    let text = codec::encode(frame)?;
    sender.send(Message::Text(text)).await?;
    Ok(())
}
