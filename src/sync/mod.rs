//! Guestbook synchronization
//!
//! Keeps one guest's view of the guestbook live and gates their writes:
//!
//! - **synchronizer**: session, live feed, submit/delete flows
//! - **form**: RSVP form state, optionally name-locked by the invitation link
//! - **pagination**: "show more" display limit
//! - **status**: user-visible status and errors

pub mod form;
pub mod pagination;
pub mod status;
pub mod synchronizer;

pub use form::GuestForm;
pub use pagination::{DisplayLimit, DEFAULT_INITIAL_LIMIT, DEFAULT_LIMIT_STEP};
pub use status::{Status, SyncError};
pub use synchronizer::{EntryView, FeedState, GuestbookSynchronizer, ReconnectPolicy, SyncConfig};
