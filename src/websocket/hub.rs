//! WebSocket Connection Hub
//!
//! Tracks live connections and fans every store snapshot out to all of
//! them. The hub remembers the latest snapshot so a new connection starts
//! from the same state everyone else has.

use futures_util::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::messages::ServerMessage;
use crate::store::{GuestbookEntry, GuestbookStore};

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

/// A freshly registered connection
#[derive(Debug)]
pub struct Registration {
    pub id: ConnectionId,
    /// Snapshot to send before anything queued on the connection's channel
    pub latest: Option<Vec<GuestbookEntry>>,
}

/// Configuration for the connection hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
        }
    }
}

struct HubState {
    connections: HashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>,
    latest: Option<Vec<GuestbookEntry>>,
}

/// Manages all WebSocket connections
pub struct ConnectionHub {
    state: RwLock<HubState>,
    config: HubConfig,
}

impl ConnectionHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            state: RwLock::new(HubState {
                connections: HashMap::new(),
                latest: None,
            }),
            config,
        }
    }

    /// Register a new connection
    ///
    /// The returned registration carries the snapshot current at the moment
    /// of registration. Every later snapshot is queued on `sender`, so a
    /// connection that sends `latest` first sees no gap and no reordering.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<Registration, HubError> {
        let mut state = self.state.write().await;
        if state.connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections(self.config.max_connections));
        }

        let id = Uuid::new_v4().to_string();
        state.connections.insert(id.clone(), sender);

        tracing::info!(connection_id = %id, "WebSocket connected");
        Ok(Registration {
            id,
            latest: state.latest.clone(),
        })
    }

    pub async fn unregister(&self, id: &str) {
        self.state.write().await.connections.remove(id);
        tracing::info!(connection_id = %id, "WebSocket disconnected");
    }

    /// Record `entries` as the latest snapshot and send it to every connection
    pub async fn broadcast_snapshot(&self, entries: Vec<GuestbookEntry>) {
        let mut state = self.state.write().await;

        let mut sent_count = 0;
        for sender in state.connections.values() {
            if sender.send(ServerMessage::snapshot(entries.clone())).is_ok() {
                sent_count += 1;
            }
        }
        state.latest = Some(entries);

        tracing::trace!(connections = sent_count, "Broadcast snapshot");
    }

    /// The last snapshot broadcast, if any
    pub async fn latest(&self) -> Option<Vec<GuestbookEntry>> {
        self.state.read().await.latest.clone()
    }

    pub async fn connection_count(&self) -> usize {
        self.state.read().await.connections.len()
    }
}

/// Forward every store snapshot to the hub, resubscribing after failures
pub fn spawn_snapshot_forwarder(
    hub: Arc<ConnectionHub>,
    store: Arc<dyn GuestbookStore>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match store.subscribe().await {
                Ok(mut snapshots) => {
                    while let Some(next) = snapshots.next().await {
                        match next {
                            Ok(entries) => hub.broadcast_snapshot(entries).await,
                            Err(e) => {
                                tracing::warn!(error = %e, "Snapshot feed error");
                                break;
                            }
                        }
                    }
                    tracing::warn!("Snapshot feed ended, resubscribing");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to subscribe to store");
                }
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    })
}

/// Errors that can occur in the connection hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SessionIdentity;
    use crate::store::{Attendance, EntryStore, NewEntry};

    fn entry(id: &str) -> GuestbookEntry {
        GuestbookEntry {
            id: id.to_string(),
            author_name: "Ani".to_string(),
            attendance: Attendance::Attending,
            message: "Selamat".to_string(),
            submitted_at: None,
            owner_key: SessionIdentity::new("s1").owner_key(),
        }
    }

    fn snapshot_len(msg: ServerMessage) -> usize {
        match msg {
            ServerMessage::Snapshot { entries, total } => {
                assert_eq!(entries.len(), total);
                total
            }
            other => panic!("Expected Snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_unregister() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = hub.register(tx).await.unwrap().id;
        assert!(!id.is_empty());
        assert_eq!(hub.connection_count().await, 1);

        hub.unregister(&id).await;
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let hub = ConnectionHub::new(HubConfig { max_connections: 2 });

        let (tx1, _) = mpsc::unbounded_channel();
        let (tx2, _) = mpsc::unbounded_channel();
        let (tx3, _) = mpsc::unbounded_channel();

        hub.register(tx1).await.unwrap();
        hub.register(tx2).await.unwrap();
        let result = hub.register(tx3).await;

        assert!(matches!(result, Err(HubError::TooManyConnections(2))));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_everyone() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        hub.register(tx1).await.unwrap();
        hub.register(tx2).await.unwrap();

        hub.broadcast_snapshot(vec![entry("a"), entry("b")]).await;

        assert_eq!(snapshot_len(rx1.try_recv().unwrap()), 2);
        assert_eq!(snapshot_len(rx2.try_recv().unwrap()), 2);
    }

    #[tokio::test]
    async fn test_late_connection_gets_latest() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let first = hub.register(tx).await.unwrap();
        assert!(first.latest.is_none());

        hub.broadcast_snapshot(vec![entry("a")]).await;
        assert_eq!(snapshot_len(rx.try_recv().unwrap()), 1);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let late = hub.register(tx).await.unwrap();
        assert_eq!(late.latest.map(|e| e.len()), Some(1));
        assert!(rx.try_recv().is_err());

        hub.broadcast_snapshot(vec![entry("a"), entry("b")]).await;
        assert_eq!(snapshot_len(rx.try_recv().unwrap()), 2);
        assert_eq!(hub.latest().await.map(|e| e.len()), Some(2));
    }

    #[tokio::test]
    async fn test_forwarder_follows_store() {
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let store = Arc::new(EntryStore::in_memory());
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register(tx).await.unwrap();

        let task = spawn_snapshot_forwarder(hub.clone(), store.clone());
        assert_eq!(snapshot_len(rx.recv().await.unwrap()), 0);

        store
            .create_entry(NewEntry::new(
                "Ani",
                Attendance::Attending,
                "Hi",
                SessionIdentity::new("s1"),
            ))
            .await
            .unwrap();
        assert_eq!(snapshot_len(rx.recv().await.unwrap()), 1);

        task.abort();
    }
}
