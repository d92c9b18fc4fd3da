//! Durable single-record session persistence.
//!
//! The store holds at most one serialized user record; absence or a
//! malformed value reads back as "no session." Writes are write-through and
//! replace the whole record.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::services::session::User;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session store io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session store encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Synchronous local persistence for the session record.
pub trait SessionStore: Send + Sync {
    /// Read the persisted record. Malformed content is "no session", not an
    /// error; only unreadable storage reports one.
    fn load(&self) -> Result<Option<User>, StoreError>;

    /// Persist the record, replacing any previous one.
    fn save(&self, user: &User) -> Result<(), StoreError>;

    /// Erase the record. Erasing an empty store succeeds.
    fn clear(&self) -> Result<(), StoreError>;
}

/// On-disk envelope around the user record.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    /// RFC 3339 write timestamp; diagnostics only, no expiry semantics.
    saved_at: String,
    user: User,
}

// =============================================================================
// FILE STORE
// =============================================================================

/// JSON-file store, one file holding one session.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Option<User>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(stored) => Ok(Some(stored.user)),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "stored session unreadable; treating as signed out"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, user: &User) -> Result<(), StoreError> {
        let stored = StoredSession {
            saved_at: OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
            user: user.clone(),
        };
        let json = serde_json::to_string_pretty(&stored)?;
        // Write-then-rename; a half-written record is never observable.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

// =============================================================================
// MEMORY STORE (tests)
// =============================================================================

/// In-memory store backing unit tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: std::sync::Mutex<Option<User>>,
}

#[cfg(test)]
impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user(user: User) -> Self {
        Self { slot: std::sync::Mutex::new(Some(user)) }
    }
}

#[cfg(test)]
impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<User>, StoreError> {
        Ok(self.slot.lock().unwrap().clone())
    }

    fn save(&self, user: &User) -> Result<(), StoreError> {
        *self.slot.lock().unwrap() = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
