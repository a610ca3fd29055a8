//! WebSocket Message Types
//!
//! Messages exchanged between browsers and the guestbook server.

use serde::{Deserialize, Serialize};

use crate::store::GuestbookEntry;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ping for keepalive
    Ping,
    /// Ask for the current snapshot again
    Refresh,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established
    Connected {
        /// Unique connection identifier
        connection_id: String,
    },
    /// Full guestbook, in display order; replaces whatever the client holds
    Snapshot {
        entries: Vec<GuestbookEntry>,
        total: usize,
    },
    /// Pong response to ping
    Pong,
    /// Error message
    Error {
        /// Error description
        message: String,
    },
}

impl ServerMessage {
    pub fn snapshot(entries: Vec<GuestbookEntry>) -> Self {
        ServerMessage::Snapshot {
            total: entries.len(),
            entries,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SessionIdentity;
    use crate::store::Attendance;

    #[test]
    fn test_client_message_deserialize() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type": "ping"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));

        let msg: ClientMessage = serde_json::from_str(r#"{"type": "refresh"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Refresh));

        assert!(serde_json::from_str::<ClientMessage>(r#"{"type": "subscribe"}"#).is_err());
    }

    #[test]
    fn test_server_message_serialize_snapshot() {
        let entry = GuestbookEntry {
            id: "e1".to_string(),
            author_name: "Ani".to_string(),
            attendance: Attendance::Attending,
            message: "Selamat".to_string(),
            submitted_at: None,
            owner_key: SessionIdentity::new("s1").owner_key(),
        };
        let json = serde_json::to_string(&ServerMessage::snapshot(vec![entry])).unwrap();
        assert!(json.contains("\"type\":\"snapshot\""));
        assert!(json.contains("\"total\":1"));
        assert!(json.contains("\"attendance\":\"yes\""));
    }

    #[test]
    fn test_server_message_serialize_connected() {
        let msg = ServerMessage::Connected {
            connection_id: "abc-123".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"connected\""));
        assert!(json.contains("\"connection_id\":\"abc-123\""));
    }
}
