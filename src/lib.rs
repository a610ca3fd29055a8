//! # Guestbook
//!
//! Live RSVP and well-wishes wall for a wedding invitation.
//!
//! Guests sign in anonymously, leave an entry (name, attendance, message) and
//! see everyone else's entries appear as they are written. A guest can delete
//! only the entries their own session created.
//!
//! ## Modules
//!
//! - [`store`]: Entry store with journal persistence and live snapshots
//! - [`identity`]: Anonymous session identities
//! - [`sync`]: Client-side synchronizer (form, feed, pagination, delete flow)
//! - [`invitation`]: Guest name, countdown, QR e-ticket
//! - [`api`]: REST + SSE server with Axum
//! - [`websocket`]: Snapshot push over WebSocket
//! - [`client`]: Remote backend over HTTP
//! - [`config`]: TOML configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use guestbook::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(EntryStore::in_memory());
//!     let issuer = AnonymousIssuer::default();
//!
//!     let session = SessionContext::establish(&issuer, None).await;
//!     let mut guestbook = GuestbookSynchronizer::new(store, session, SyncConfig::default());
//!     guestbook.start()?;
//!
//!     guestbook.form_mut().set_name("Ani");
//!     guestbook.form_mut().set_attendance(Attendance::Attending);
//!     guestbook.form_mut().set_message("Selamat menempuh hidup baru!");
//!     guestbook.submit().await?;
//!
//!     guestbook.wait_for(|entries| !entries.is_empty()).await;
//!     for entry in guestbook.visible_entries() {
//!         println!("{} ({}): {}", entry.author_name, entry.attendance_label, entry.message);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod identity;
pub mod invitation;
pub mod store;
pub mod sync;
pub mod websocket;

// Re-export top-level types for convenience
pub use store::{
    Attendance, EntryStore, GuestbookEntry, GuestbookStore, NewEntry, StoreConfig, StoreError,
    StoreResult, ValidationError,
};

pub use identity::{
    AnonymousIssuer, IdentityError, IdentityService, SessionCache, SessionContext,
    SessionIdentity,
};

pub use sync::{
    DisplayLimit, EntryView, GuestForm, GuestbookSynchronizer, Status, SyncConfig, SyncError,
};

pub use invitation::{GuestName, InvitationProfile, InvitationView, QrTicket, TimeLeft};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use client::{RemoteConfig, RemoteGuestbook};

pub use config::{Config, ConfigError};
