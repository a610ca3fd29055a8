//! On-disk cache of the issued session identity
//!
//! Lets a command-line guest delete their own entry in a later run.

use std::path::{Path, PathBuf};

use super::SessionIdentity;

/// File holding one session identity
#[derive(Debug, Clone)]
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/guestbook/session`, or `./.guestbook_session` when no data
    /// directory is known
    pub fn default_location() -> Self {
        let path = dirs::data_local_dir()
            .map(|p| p.join("guestbook").join("session"))
            .unwrap_or_else(|| PathBuf::from(".guestbook_session"));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached identity, if any
    pub fn load(&self) -> Option<SessionIdentity> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let value = content.trim();
        if value.is_empty() {
            None
        } else {
            Some(SessionIdentity::new(value))
        }
    }

    /// Remember an identity
    pub fn store(&self, identity: &SessionIdentity) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, identity.as_str())
    }

    /// Forget the cached identity
    pub fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_store_and_load() {
        let dir = tempdir().unwrap();
        let cache = SessionCache::new(dir.path().join("nested").join("session"));

        assert!(cache.load().is_none());

        cache.store(&SessionIdentity::new("abc-123")).unwrap();
        assert_eq!(cache.load(), Some(SessionIdentity::new("abc-123")));

        cache.clear().unwrap();
        assert!(cache.load().is_none());
        cache.clear().unwrap();
    }
}
