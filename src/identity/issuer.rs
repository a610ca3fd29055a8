//! Anonymous identity issuer
//!
//! Issues random UUID identities. An identity presented again by a client is
//! reused as long as it is well-formed, so a guest keeps ownership of their
//! entries across server restarts.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{IdentityError, IdentityService, SessionIdentity};

/// Configuration for the issuer
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    /// Maximum number of identities this process will hand out
    pub max_sessions: Option<usize>,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            max_sessions: Some(100_000),
        }
    }
}

/// In-process identity service
pub struct AnonymousIssuer {
    known: RwLock<HashSet<String>>,
    config: IssuerConfig,
}

impl AnonymousIssuer {
    pub fn new(config: IssuerConfig) -> Self {
        Self {
            known: RwLock::new(HashSet::new()),
            config,
        }
    }

    /// Number of identities issued or adopted so far
    pub async fn session_count(&self) -> usize {
        self.known.read().await.len()
    }

    fn is_well_formed(identity: &SessionIdentity) -> bool {
        Uuid::parse_str(identity.as_str()).is_ok()
    }
}

impl Default for AnonymousIssuer {
    fn default() -> Self {
        Self::new(IssuerConfig::default())
    }
}

#[async_trait]
impl IdentityService for AnonymousIssuer {
    async fn establish_anonymous_session(
        &self,
        existing: Option<&SessionIdentity>,
    ) -> Result<SessionIdentity, IdentityError> {
        let mut known = self.known.write().await;

        if let Some(existing) = existing {
            if known.contains(existing.as_str()) {
                tracing::debug!(owner = %existing.owner_key(), "Reusing session identity");
                return Ok(existing.clone());
            }
            if Self::is_well_formed(existing) {
                known.insert(existing.as_str().to_string());
                tracing::debug!(owner = %existing.owner_key(), "Adopted session identity");
                return Ok(existing.clone());
            }
            tracing::debug!(owner = %existing.owner_key(), "Ignoring malformed session identity");
        }

        if let Some(max) = self.config.max_sessions {
            if known.len() >= max {
                return Err(IdentityError::LimitReached(max));
            }
        }

        let identity = SessionIdentity::new(Uuid::new_v4().to_string());
        known.insert(identity.as_str().to_string());
        tracing::info!(owner = %identity.owner_key(), "Issued session identity");
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issues_new_identity() {
        let issuer = AnonymousIssuer::default();
        let a = issuer.establish_anonymous_session(None).await.unwrap();
        let b = issuer.establish_anonymous_session(None).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(issuer.session_count().await, 2);
    }

    #[tokio::test]
    async fn test_reuses_existing_identity() {
        let issuer = AnonymousIssuer::default();
        let a = issuer.establish_anonymous_session(None).await.unwrap();
        let again = issuer.establish_anonymous_session(Some(&a)).await.unwrap();
        assert_eq!(a, again);
        assert_eq!(issuer.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_adopts_well_formed_identity_after_restart() {
        let issuer = AnonymousIssuer::default();
        let remembered = SessionIdentity::new(Uuid::new_v4().to_string());
        let got = issuer
            .establish_anonymous_session(Some(&remembered))
            .await
            .unwrap();
        assert_eq!(got, remembered);
    }

    #[tokio::test]
    async fn test_malformed_identity_gets_replaced() {
        let issuer = AnonymousIssuer::default();
        let bogus = SessionIdentity::new("local-not-a-uuid");
        let got = issuer.establish_anonymous_session(Some(&bogus)).await.unwrap();
        assert_ne!(got, bogus);
    }

    #[tokio::test]
    async fn test_session_limit() {
        let issuer = AnonymousIssuer::new(IssuerConfig {
            max_sessions: Some(1),
        });
        issuer.establish_anonymous_session(None).await.unwrap();
        let result = issuer.establish_anonymous_session(None).await;
        assert!(matches!(result, Err(IdentityError::LimitReached(1))));
    }
}
