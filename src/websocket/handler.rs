//! WebSocket Handler
//!
//! One task per connection. It sends `connected` and the current snapshot,
//! then interleaves hub broadcasts with replies to client messages.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::{ConnectionHub, Registration};
use super::messages::{ClientMessage, ServerMessage};
use crate::api::AppState;

type Outbound = SplitSink<WebSocket, Message>;

/// GET /ws
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let hub = Arc::clone(&state.ws_hub);
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// What to do after an inbound frame
#[derive(Debug)]
enum Reply {
    Send(ServerMessage),
    Nothing,
    Close,
}

fn encode(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            None
        }
    }
}

/// Returns false once the peer is gone
async fn send(sender: &mut Outbound, message: &ServerMessage) -> bool {
    match encode(message) {
        Some(frame) => sender.send(frame).await.is_ok(),
        None => true,
    }
}

async fn handle_socket(socket: WebSocket, hub: Arc<ConnectionHub>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let Registration { id, latest } = match hub.register(tx).await {
        Ok(registration) => registration,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected WebSocket connection");
            send(&mut sender, &ServerMessage::error(e.to_string())).await;
            return;
        }
    };

    let mut open = send(
        &mut sender,
        &ServerMessage::Connected {
            connection_id: id.clone(),
        },
    )
    .await;
    if let Some(entries) = latest {
        open = open && send(&mut sender, &ServerMessage::snapshot(entries)).await;
    }

    while open {
        tokio::select! {
            outbound = rx.recv() => match outbound {
                Some(message) => open = send(&mut sender, &message).await,
                None => open = false,
            },
            inbound = receiver.next() => match inbound {
                Some(Ok(frame)) => match reply_to(&hub, frame).await {
                    Reply::Send(message) => open = send(&mut sender, &message).await,
                    Reply::Nothing => {}
                    Reply::Close => {
                        tracing::debug!(connection_id = %id, "Client requested close");
                        open = false;
                    }
                },
                Some(Err(e)) => {
                    tracing::debug!(connection_id = %id, error = %e, "WebSocket receive error");
                    open = false;
                }
                None => open = false,
            },
        }
    }

    hub.unregister(&id).await;
}

async fn reply_to(hub: &ConnectionHub, frame: Message) -> Reply {
    match frame {
        Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::Ping) => Reply::Send(ServerMessage::Pong),
            Ok(ClientMessage::Refresh) => match hub.latest().await {
                Some(entries) => Reply::Send(ServerMessage::snapshot(entries)),
                None => Reply::Nothing,
            },
            Err(e) => Reply::Send(ServerMessage::error(format!(
                "Invalid message format: {}",
                e
            ))),
        },
        Message::Binary(_) => Reply::Send(ServerMessage::error("Binary messages not supported")),
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => Reply::Nothing,
        Message::Close(_) => Reply::Close,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::HubConfig;

    fn text(s: &str) -> Message {
        Message::Text(s.to_string())
    }

    #[tokio::test]
    async fn test_ping_and_invalid_message() {
        let hub = ConnectionHub::new(HubConfig::default());

        assert!(matches!(
            reply_to(&hub, text(r#"{"type":"ping"}"#)).await,
            Reply::Send(ServerMessage::Pong)
        ));
        assert!(matches!(
            reply_to(&hub, text("nonsense")).await,
            Reply::Send(ServerMessage::Error { .. })
        ));
        assert!(matches!(
            reply_to(&hub, Message::Binary(vec![1, 2])).await,
            Reply::Send(ServerMessage::Error { .. })
        ));
        assert!(matches!(
            reply_to(&hub, Message::Close(None)).await,
            Reply::Close
        ));
    }

    #[tokio::test]
    async fn test_refresh_resends_snapshot() {
        let hub = ConnectionHub::new(HubConfig::default());
        let refresh = r#"{"type":"refresh"}"#;
        assert!(matches!(reply_to(&hub, text(refresh)).await, Reply::Nothing));

        hub.broadcast_snapshot(Vec::new()).await;
        assert!(matches!(
            reply_to(&hub, text(refresh)).await,
            Reply::Send(ServerMessage::Snapshot { total: 0, .. })
        ));
    }
}
