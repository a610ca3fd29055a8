//! Session context
//!
//! The established session for one page load or CLI run. Constructed
//! explicitly and handed to the synchronizer.

use uuid::Uuid;

use super::{IdentityService, SessionIdentity};
use crate::store::GuestbookEntry;

/// Where the session identity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    /// Handed out by the identity service
    Issued,
    /// Generated locally after the identity service failed
    Fallback,
}

/// Current session state
#[derive(Debug, Clone)]
pub struct SessionContext {
    identity: Option<SessionIdentity>,
    origin: Option<SessionOrigin>,
    error: Option<String>,
}

impl SessionContext {
    /// A session that has not been established yet
    pub fn pending() -> Self {
        Self {
            identity: None,
            origin: None,
            error: None,
        }
    }

    /// A session backed by an issued identity
    pub fn issued(identity: SessionIdentity) -> Self {
        Self {
            identity: Some(identity),
            origin: Some(SessionOrigin::Issued),
            error: None,
        }
    }

    /// A degraded session with a locally generated identity
    pub fn fallback(error: impl Into<String>) -> Self {
        let identity = SessionIdentity::new(format!("local-{}", Uuid::new_v4()));
        Self {
            identity: Some(identity),
            origin: Some(SessionOrigin::Fallback),
            error: Some(error.into()),
        }
    }

    /// Ask the identity service for an identity, falling back to a local one
    /// on failure. Never fails: a degraded session is still ready.
    pub async fn establish(
        service: &dyn IdentityService,
        cached: Option<&SessionIdentity>,
    ) -> Self {
        match service.establish_anonymous_session(cached).await {
            Ok(identity) => {
                tracing::info!(owner = %identity.owner_key(), "Session established");
                Self::issued(identity)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Identity service failed, using local identity");
                Self::fallback(e.to_string())
            }
        }
    }

    /// Whether writes may be issued
    pub fn is_ready(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    pub fn origin(&self) -> Option<SessionOrigin> {
        self.origin
    }

    /// Running on a locally generated identity
    pub fn is_degraded(&self) -> bool {
        self.origin == Some(SessionOrigin::Fallback)
    }

    /// Error text from a failed establishment
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether this session created `entry`
    pub fn owns(&self, entry: &GuestbookEntry) -> bool {
        match &self.identity {
            Some(identity) => entry.is_owned_by(identity),
            None => false,
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::pending()
    }
}
