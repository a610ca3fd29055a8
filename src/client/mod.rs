//! Clients for a remote guestbook server

mod remote;

pub use remote::{RemoteConfig, RemoteGuestbook};
