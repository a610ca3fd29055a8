//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON and shared with
//! the remote client.

use serde::{Deserialize, Serialize};

use crate::identity::SessionIdentity;
use crate::store::GuestbookEntry;

/// Header carrying the caller's session identity on writes
pub const SESSION_HEADER: &str = "x-guestbook-session";

/// SSE event name for a full snapshot
pub const SNAPSHOT_EVENT: &str = "snapshot";

/// SSE event name for a feed failure
pub const ERROR_EVENT: &str = "error";

// ============================================
// SESSION DTOs
// ============================================

/// Establish-session request
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SessionRequest {
    /// Identity from an earlier session, to be reused if recognised
    #[serde(default)]
    pub existing: Option<SessionIdentity>,
}

/// Establish-session response
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub identity: SessionIdentity,
}

// ============================================
// ENTRY DTOs
// ============================================

/// Create-entry request; the identity comes from the session header
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEntryRequest {
    #[serde(default)]
    pub author_name: String,
    /// `"yes"` or `"no"`
    #[serde(default)]
    pub attendance: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Create-entry response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEntryResponse {
    pub id: String,
}

/// Entry list response
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryListResponse {
    /// Newest first
    pub entries: Vec<GuestbookEntry>,
    pub total: usize,
}

// ============================================
// INVITATION DTOs
// ============================================

/// `?to=` query for invitation endpoints
#[derive(Debug, Default, Deserialize)]
pub struct InvitationQuery {
    #[serde(default)]
    pub to: Option<String>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    /// "ok" or "error"
    pub store: String,
    pub entries: usize,
    pub ws_connections: usize,
    pub uptime_seconds: u64,
    pub version: String,
}
