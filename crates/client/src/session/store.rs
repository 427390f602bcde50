//! Token persistence.
//!
//! A session is three values: access token, refresh token, and user type.
//! [`StoredTokens`] bundles them into one record so they are always written
//! and cleared together.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use agrilink_core::UserType;

use super::SessionError;

/// The persisted session record.
///
/// Implements `Debug` manually to redact token values.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredTokens {
    /// Short-lived bearer token carrying the expiry claim.
    pub access_token: String,
    /// Long-lived token used for the refresh exchange.
    pub refresh_token: String,
    /// Account type recorded at login.
    pub user_type: UserType,
}

impl std::fmt::Debug for StoredTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredTokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("user_type", &self.user_type)
            .finish()
    }
}

/// Backend-agnostic token storage.
///
/// The record is saved and cleared as a unit; partial writes are not
/// representable through this interface.
pub trait TokenStore: Send + Sync {
    /// Load the stored record, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> Result<Option<StoredTokens>, SessionError>;

    /// Replace the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, tokens: &StoredTokens) -> Result<(), SessionError>;

    /// Remove the stored record entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn clear(&self) -> Result<(), SessionError>;
}

/// In-memory token store, for tests and short-lived tools.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<StoredTokens>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredTokens>, SessionError> {
        Ok(self.tokens.lock().map_err(|_| SessionError::Poisoned)?.clone())
    }

    fn save(&self, tokens: &StoredTokens) -> Result<(), SessionError> {
        *self.tokens.lock().map_err(|_| SessionError::Poisoned)? = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.tokens.lock().map_err(|_| SessionError::Poisoned)? = None;
        Ok(())
    }
}

/// File-backed token store (one JSON document).
///
/// The write path goes through a temp file in the same directory followed by
/// a rename, so a crash mid-save cannot leave a half-written record.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store backed by the given file path.
    ///
    /// The file does not need to exist yet; parent directories are created
    /// on first save.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredTokens>, SessionError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::Storage(e)),
        };
        let tokens = serde_json::from_slice(&bytes)?;
        Ok(Some(tokens))
    }

    fn save(&self, tokens: &StoredTokens) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(&serde_json::to_vec_pretty(tokens)?)?;
        file.sync_all()?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Storage(e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> StoredTokens {
        StoredTokens {
            access_token: "access.jwt.sig".to_string(),
            refresh_token: "refresh.jwt.sig".to_string(),
            user_type: UserType::Farmer,
        }
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));

        assert!(store.load().unwrap().is_none());
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested/deeper/session.json"));
        store.save(&sample()).unwrap();
        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let debug = format!("{:?}", sample());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("access.jwt.sig"));
    }
}
