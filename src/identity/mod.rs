//! Anonymous Session Identity
//!
//! Every guest gets an opaque identity once per session. It is used only to
//! decide who may delete an entry; it is not authentication.
//!
//! The identity itself is a bearer secret held by the guest. Entries carry
//! only its `OwnerKey`, a one-way digest that is safe to publish.
//!
//! ## Architecture
//!
//! - **IdentityService**: the capability that hands out identities
//! - **AnonymousIssuer**: in-process implementation used by the server
//! - **SessionContext**: the established session injected into the synchronizer
//! - **SessionCache**: remembers an issued identity between CLI runs

mod cache;
mod issuer;
mod session;

pub use cache::SessionCache;
pub use issuer::{AnonymousIssuer, IssuerConfig};
pub use session::{SessionContext, SessionOrigin};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Namespace for deriving owner keys from session identities
const OWNER_KEY_NAMESPACE: Uuid = Uuid::from_u128(0x8c1d_52a4_6f3e_4b9a_a0d2_7e51_c3f8_09b6);

/// Opaque anonymous session identifier. Never published.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionIdentity(String);

impl SessionIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public key standing for this identity on the entries it writes
    pub fn owner_key(&self) -> OwnerKey {
        OwnerKey(Uuid::new_v5(&OWNER_KEY_NAMESPACE, self.0.as_bytes()).to_string())
    }
}

impl std::fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner tag stored and broadcast with each entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerKey(String);

impl OwnerKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out anonymous identities
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Reuse `existing` when the service accepts it, otherwise issue a new one
    async fn establish_anonymous_session(
        &self,
        existing: Option<&SessionIdentity>,
    ) -> Result<SessionIdentity, IdentityError>;
}

/// Errors from the identity service
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity service unavailable: {0}")]
    Unavailable(String),

    #[error("Identity request rejected: {0}")]
    Rejected(String),

    #[error("Too many sessions (limit: {0})")]
    LimitReached(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_key_is_stable_and_distinct() {
        let me = SessionIdentity::new("3f0c1e9a-1111-4000-8000-000000000000");
        assert_eq!(me.owner_key(), me.clone().owner_key());
        assert_ne!(me.owner_key(), SessionIdentity::new("someone").owner_key());
    }

    #[test]
    fn test_owner_key_does_not_reveal_identity() {
        let me = SessionIdentity::new("3f0c1e9a-1111-4000-8000-000000000000");
        let key = me.owner_key();
        assert_ne!(key.as_str(), me.as_str());
        // Presenting the key as an identity derives a different key
        assert_ne!(SessionIdentity::new(key.as_str()).owner_key(), key);
    }
}
