//! Guestbook Store
//!
//! The persistence service for guestbook entries:
//!
//! - **types**: Entry types, attendance, display ordering, validation
//! - **journal**: Append-only on-disk record of creates and deletes
//! - **engine**: In-process store with full-snapshot change notifications
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   NewEntry → validate → Journal (fsync) → map → snapshot
//!
//! Read Path:
//!   subscribe → current snapshot → one snapshot per change
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use guestbook::identity::SessionIdentity;
//! use guestbook::store::{Attendance, EntryStore, GuestbookStore, NewEntry, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = EntryStore::open(StoreConfig::persistent("./guestbook_data"))?;
//!
//!     let id = store
//!         .create_entry(NewEntry::new(
//!             "Budi Santoso",
//!             Attendance::Attending,
//!             "Selamat menempuh hidup baru!",
//!             SessionIdentity::new("3f0c1e9a-0000-4000-8000-000000000000"),
//!         ))
//!         .await?;
//!
//!     println!("Created {}", id);
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod error;
pub mod journal;
pub mod types;

pub use engine::{EntryStore, StoreConfig, StoreStats};
pub use error::{StoreError, StoreResult};
pub use journal::{Journal, JournalRecord, JournalSyncMode};
pub use types::{
    display_order, sort_for_display, validate_fields, Attendance, GuestbookEntry, NewEntry,
    ValidationError, JUST_NOW, MAX_MESSAGE_LEN, MAX_NAME_LEN,
};

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::identity::SessionIdentity;

/// Live feed of full collection snapshots, in display order
pub type SnapshotStream = BoxStream<'static, StoreResult<Vec<GuestbookEntry>>>;

/// The persistence capability the synchronizer is written against
#[async_trait]
pub trait GuestbookStore: Send + Sync {
    /// Create an entry; the store assigns id and timestamp
    async fn create_entry(&self, entry: NewEntry) -> StoreResult<String>;

    /// Delete an entry on behalf of `requester`, who must own it
    async fn delete_entry(&self, id: &str, requester: &SessionIdentity) -> StoreResult<()>;

    /// Full collection, newest first
    async fn list_entries(&self) -> StoreResult<Vec<GuestbookEntry>>;

    /// Current snapshot, then a new snapshot after every change
    async fn subscribe(&self) -> StoreResult<SnapshotStream>;
}
