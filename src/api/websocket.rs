//! WebSocket handler for the dashboard subscriber channel
//!
//! Each connection gets one `initialData` snapshot, then a live feed of
//! `dataUpdate` / `newAlert` / `alertAcknowledged` events. The subscriber can
//! send `requestData` (fresh snapshot, replied to it alone) and
//! `acknowledgeAlert` (alert id) actions back over the same socket.
//!
//! Every subscriber holds its own bounded broadcast receiver: one that stops
//! draining loses its oldest undelivered events (logged as lag) while
//! ingestion carries on.

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::SplitSink, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    actors::messages::StreamEvent,
    alerts::AckError,
    api::state::ApiState,
};

/// Actions a dashboard can send over the channel
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ClientAction {
    /// Ask for a fresh full snapshot, replied to this subscriber only
    RequestData,

    /// Acknowledge an alert by id
    #[serde(rename_all = "camelCase")]
    AcknowledgeAlert { alert_id: u64 },
}

/// WebSocket upgrade handler
///
/// GET /api/v1/stream
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<ApiState>) -> Response {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

/// Handle WebSocket connection
async fn handle_websocket(socket: WebSocket, state: ApiState) {
    info!("dashboard client connected");

    let (mut sender, mut receiver) = socket.split();

    // Subscribe before snapshotting so nothing between the two is lost; a
    // subscriber may see an update twice, never a gap.
    let mut stream_rx = state.stream_tx.subscribe();

    match state.state.snapshot().await {
        Ok(snapshot) => {
            let json = serde_json::json!({
                "type": "initialData",
                "data": snapshot,
            });
            if !send_json(&mut sender, &json).await {
                debug!("WebSocket send failed, client disconnected");
                return;
            }
        }
        Err(e) => {
            warn!("could not take initial snapshot: {e}");
            return;
        }
    }

    loop {
        tokio::select! {
            // Forward stream events
            event = stream_rx.recv() => match event {
                Ok(event) => {
                    if !send_json(&mut sender, &serialize_event(&event)).await {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("subscriber lagging, dropped {skipped} events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("stream channel closed");
                    break;
                }
            },

            // Handle subscriber actions
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if !handle_client_action(&text, &state, &mut sender).await {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {
                    // Pings are answered by axum; ignore the rest.
                }
                Some(Err(e)) => {
                    debug!("WebSocket receive error: {e}");
                    break;
                }
            },
        }
    }

    info!("dashboard client disconnected");
}

fn serialize_event(event: &StreamEvent) -> serde_json::Value {
    match event {
        StreamEvent::DataUpdate {
            topic,
            payload,
            timestamp,
        } => serde_json::json!({
            "type": "dataUpdate",
            "topic": topic,
            "payload": payload,
            "timestamp": timestamp.to_rfc3339(),
        }),

        StreamEvent::NewAlert(alert) => serde_json::json!({
            "type": "newAlert",
            "alert": alert,
        }),

        StreamEvent::AlertAcknowledged { alert_id } => serde_json::json!({
            "type": "alertAcknowledged",
            "alertId": alert_id,
        }),
    }
}

/// Process one subscriber-originated action.
///
/// Returns `false` when the connection should be torn down.
async fn handle_client_action(
    text: &str,
    state: &ApiState,
    sender: &mut SplitSink<WebSocket, Message>,
) -> bool {
    let action = match serde_json::from_str::<ClientAction>(text) {
        Ok(action) => action,
        Err(e) => {
            debug!("ignoring malformed client message: {e}");
            return true;
        }
    };

    match action {
        ClientAction::RequestData => match state.state.snapshot().await {
            Ok(snapshot) => {
                let json = serde_json::json!({
                    "type": "initialData",
                    "data": snapshot,
                });
                send_json(sender, &json).await
            }
            Err(e) => {
                warn!("could not take snapshot: {e}");
                false
            }
        },

        ClientAction::AcknowledgeAlert { alert_id } => {
            match state.state.acknowledge(alert_id).await {
                Ok(ack) => {
                    if ack.transitioned {
                        info!("alert {alert_id} acknowledged via subscriber action");
                        let _ = state
                            .stream_tx
                            .send(StreamEvent::AlertAcknowledged { alert_id });
                    }
                    true
                }
                Err(AckError::NotFound(id)) => {
                    // The REST path reports this as 404; mirror it here
                    // instead of swallowing the miss.
                    let json = serde_json::json!({
                        "type": "error",
                        "message": format!("no alert with id {id}"),
                    });
                    send_json(sender, &json).await
                }
                Err(AckError::StoreClosed) => false,
            }
        }
    }
}

async fn send_json(sender: &mut SplitSink<WebSocket, Message>, json: &serde_json::Value) -> bool {
    match serde_json::to_string(json) {
        Ok(text) => sender.send(Message::Text(text)).await.is_ok(),
        Err(e) => {
            warn!("failed to serialize event: {e}");
            true
        }
    }
}
