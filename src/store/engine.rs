//! Guestbook entry store
//!
//! The persistence service behind the guestbook:
//! - Write path: NewEntry → validate → Journal → map → snapshot broadcast
//! - Read path: every subscriber holds a watch receiver on the sorted snapshot
//!
//! Writes are serialized by one async RwLock; the snapshot is published while
//! the lock is held, so subscribers observe changes in write order.

use async_trait::async_trait;
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use uuid::Uuid;

use crate::identity::SessionIdentity;
use crate::store::error::{StoreError, StoreResult};
use crate::store::journal::{Journal, JournalRecord, JournalSyncMode};
use crate::store::types::{sort_for_display, GuestbookEntry, NewEntry};
use crate::store::{GuestbookStore, SnapshotStream};

/// Configuration for the entry store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory for the journal; `None` keeps everything in memory
    pub data_dir: Option<PathBuf>,
    /// Journal sync strategy
    pub journal_sync: JournalSyncMode,
    /// Compact once the journal holds this many more records than live entries
    pub compact_after: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            journal_sync: JournalSyncMode::EveryWrite,
            compact_after: 1000,
        }
    }
}

impl StoreConfig {
    /// In-memory store, nothing on disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Journaled store rooted at `data_dir`
    pub fn persistent(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            ..Default::default()
        }
    }

    /// Get path to the journal file
    pub fn journal_path(&self) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join("guestbook.journal"))
    }
}

struct StoreState {
    entries: HashMap<String, GuestbookEntry>,
    journal: Option<Journal>,
}

impl StoreState {
    fn sorted_snapshot(&self) -> Vec<GuestbookEntry> {
        let mut snapshot: Vec<_> = self.entries.values().cloned().collect();
        sort_for_display(&mut snapshot);
        snapshot
    }
}

/// Store statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub entries: usize,
    pub journal_records: Option<u64>,
    pub subscribers: usize,
}

/// In-process guestbook store
pub struct EntryStore {
    state: RwLock<StoreState>,
    snapshot_tx: watch::Sender<Arc<Vec<GuestbookEntry>>>,
    config: StoreConfig,
}

impl EntryStore {
    /// Open the store, replaying the journal if one is configured
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let (entries, journal) = match config.journal_path() {
            Some(path) => {
                let journal = Journal::open(&path, config.journal_sync)?;
                let entries = journal.recover()?;
                tracing::info!(
                    path = ?path,
                    entries = entries.len(),
                    records = journal.record_count(),
                    "Guestbook journal replayed"
                );
                (entries, Some(journal))
            }
            None => (HashMap::new(), None),
        };

        let state = StoreState { entries, journal };
        let (snapshot_tx, _) = watch::channel(Arc::new(state.sorted_snapshot()));

        Ok(Self {
            state: RwLock::new(state),
            snapshot_tx,
            config,
        })
    }

    /// Purely in-memory store
    pub fn in_memory() -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            state: RwLock::new(StoreState {
                entries: HashMap::new(),
                journal: None,
            }),
            snapshot_tx,
            config: StoreConfig::in_memory(),
        }
    }

    /// Look up a single entry
    pub async fn get_entry(&self, id: &str) -> Option<GuestbookEntry> {
        self.state.read().await.entries.get(id).cloned()
    }

    /// Current snapshot without subscribing
    pub fn snapshot(&self) -> Arc<Vec<GuestbookEntry>> {
        self.snapshot_tx.borrow().clone()
    }

    pub async fn stats(&self) -> StoreStats {
        let state = self.state.read().await;
        StoreStats {
            entries: state.entries.len(),
            journal_records: state.journal.as_ref().map(|j| j.record_count()),
            subscribers: self.snapshot_tx.receiver_count(),
        }
    }

    /// Flush and fsync the journal
    pub async fn sync(&self) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if let Some(journal) = state.journal.as_mut() {
            journal.sync()?;
        }
        Ok(())
    }

    fn publish(&self, state: &StoreState) {
        self.snapshot_tx.send_replace(Arc::new(state.sorted_snapshot()));
    }

    fn maybe_compact(&self, state: &mut StoreState) {
        let live = state.entries.len() as u64;
        let Some(journal) = state.journal.as_mut() else {
            return;
        };
        if journal.record_count() <= live + self.config.compact_after {
            return;
        }
        let entries: Vec<_> = state.entries.values().cloned().collect();
        if let Err(e) = journal.compact(&entries) {
            tracing::warn!(error = %e, "Journal compaction failed");
        }
    }
}

#[async_trait]
impl GuestbookStore for EntryStore {
    async fn create_entry(&self, entry: NewEntry) -> StoreResult<String> {
        let entry = entry.normalized();
        entry.validate()?;

        let id = Uuid::new_v4().to_string();
        let stored = entry.into_entry(id.clone(), Some(Utc::now()));

        let mut state = self.state.write().await;
        if let Some(journal) = state.journal.as_mut() {
            journal.append(&JournalRecord::Created {
                entry: stored.clone(),
            })?;
        }
        state.entries.insert(id.clone(), stored);
        self.publish(&state);

        tracing::info!(entry_id = %id, entries = state.entries.len(), "Guestbook entry created");
        Ok(id)
    }

    async fn delete_entry(&self, id: &str, requester: &SessionIdentity) -> StoreResult<()> {
        let mut state = self.state.write().await;

        let entry = state
            .entries
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if !entry.is_owned_by(requester) {
            tracing::warn!(entry_id = %id, requester = %requester.owner_key(), "Delete refused for non-owner");
            return Err(StoreError::Forbidden(id.to_string()));
        }

        if let Some(journal) = state.journal.as_mut() {
            journal.append(&JournalRecord::Deleted { id: id.to_string() })?;
        }
        state.entries.remove(id);
        self.publish(&state);
        self.maybe_compact(&mut state);

        tracing::info!(entry_id = %id, entries = state.entries.len(), "Guestbook entry deleted");
        Ok(())
    }

    async fn list_entries(&self) -> StoreResult<Vec<GuestbookEntry>> {
        Ok(self.state.read().await.sorted_snapshot())
    }

    async fn subscribe(&self) -> StoreResult<SnapshotStream> {
        let rx = self.snapshot_tx.subscribe();

        // Current snapshot first, then one per change
        let snapshots = stream::unfold((rx, true), |(mut rx, first)| async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let snapshot = Vec::clone(&rx.borrow_and_update());
            Some((Ok(snapshot), (rx, false)))
        });

        Ok(snapshots.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::Attendance;
    use tempfile::tempdir;

    fn submission(name: &str, owner: &str) -> NewEntry {
        NewEntry::new(
            name,
            Attendance::Attending,
            "Semoga bahagia",
            SessionIdentity::new(owner),
        )
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamp() {
        let store = EntryStore::in_memory();
        let id = store.create_entry(submission("Budi", "s1")).await.unwrap();

        let entry = store.get_entry(&id).await.unwrap();
        assert_eq!(entry.id, id);
        assert!(entry.submitted_at.is_some());
        assert!(entry.is_owned_by(&SessionIdentity::new("s1")));
        assert_eq!(entry.owner_key, SessionIdentity::new("s1").owner_key());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid() {
        let store = EntryStore::in_memory();
        let bad = NewEntry::new("  ", Attendance::Attending, "Hi", SessionIdentity::new("s1"));
        let result = store.create_entry(bad).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(store.list_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = EntryStore::in_memory();
        let first = store.create_entry(submission("A", "s1")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.create_entry(submission("B", "s1")).await.unwrap();

        let list = store.list_entries().await.unwrap();
        assert_eq!(list[0].id, second);
        assert_eq!(list[1].id, first);
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let store = EntryStore::in_memory();
        let id = store.create_entry(submission("Budi", "owner")).await.unwrap();

        let result = store
            .delete_entry(&id, &SessionIdentity::new("intruder"))
            .await;
        assert!(matches!(result, Err(StoreError::Forbidden(_))));
        assert!(store.get_entry(&id).await.is_some());

        store
            .delete_entry(&id, &SessionIdentity::new("owner"))
            .await
            .unwrap();
        assert!(store.get_entry(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_delete_unknown() {
        let store = EntryStore::in_memory();
        let result = store
            .delete_entry("missing", &SessionIdentity::new("s1"))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_subscribe_current_then_changes() {
        let store = EntryStore::in_memory();
        store.create_entry(submission("A", "s1")).await.unwrap();

        let mut feed = store.subscribe().await.unwrap();
        let initial = feed.next().await.unwrap().unwrap();
        assert_eq!(initial.len(), 1);

        let id = store.create_entry(submission("B", "s1")).await.unwrap();
        let after_create = feed.next().await.unwrap().unwrap();
        assert_eq!(after_create.len(), 2);
        assert_eq!(after_create[0].id, id);

        store
            .delete_entry(&id, &SessionIdentity::new("s1"))
            .await
            .unwrap();
        let after_delete = feed.next().await.unwrap().unwrap();
        assert_eq!(after_delete.len(), 1);
    }

    #[tokio::test]
    async fn test_journal_survives_reopen() {
        let dir = tempdir().unwrap();
        let kept;
        {
            let store = EntryStore::open(StoreConfig::persistent(dir.path())).unwrap();
            kept = store.create_entry(submission("A", "s1")).await.unwrap();
            let gone = store.create_entry(submission("B", "s1")).await.unwrap();
            store
                .delete_entry(&gone, &SessionIdentity::new("s1"))
                .await
                .unwrap();
        }

        let store = EntryStore::open(StoreConfig::persistent(dir.path())).unwrap();
        let list = store.list_entries().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, kept);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_compaction_after_threshold() {
        let dir = tempdir().unwrap();
        let config = StoreConfig {
            compact_after: 2,
            ..StoreConfig::persistent(dir.path())
        };
        let store = EntryStore::open(config).unwrap();
        let owner = SessionIdentity::new("s1");

        for _ in 0..3 {
            let id = store.create_entry(submission("X", "s1")).await.unwrap();
            store.delete_entry(&id, &owner).await.unwrap();
        }

        let stats = store.stats().await;
        assert_eq!(stats.entries, 0);
        assert!(stats.journal_records.unwrap() <= 2);
    }
}
