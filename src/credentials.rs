//! Durable storage for the session credential.
//!
//! One opaque bearer token under a fixed storage key. Absence means
//! unauthenticated; nothing else is ever persisted here.

use parking_lot::RwLock;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Storage for the opaque bearer credential.
pub trait CredentialStore: Send + Sync {
    /// Read the stored credential, if any.
    fn load(&self) -> Option<String>;
    /// Persist the credential, replacing any previous one.
    fn save(&self, token: &str) -> io::Result<()>;
    /// Remove the stored credential. Clearing an absent credential is fine.
    fn clear(&self) -> io::Result<()>;
}

/// File-backed credential store: one token file under the state directory.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-memory credential store for tests and embedded use.
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn save(&self, token: &str) -> io::Result<()> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.token.write() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("state").join("session.token"));

        assert!(store.load().is_none());
        store.save("tok-abc123").expect("Failed to save token");
        assert_eq!(store.load().as_deref(), Some("tok-abc123"));

        store.clear().expect("Failed to clear token");
        assert!(store.load().is_none());
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("session.token"));
        store.clear().expect("Clearing an absent token should succeed");
        store.clear().expect("Clearing twice should succeed");
    }

    #[test]
    fn test_file_store_treats_blank_file_as_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.token");
        std::fs::write(&path, "  \n").unwrap();
        let store = FileCredentialStore::new(path);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryCredentialStore::new();
        assert!(store.load().is_none());
        store.save("tok-1").unwrap();
        assert_eq!(store.load().as_deref(), Some("tok-1"));
        store.clear().unwrap();
        assert!(store.load().is_none());
    }
}
