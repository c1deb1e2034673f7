#![forbid(unsafe_code)]

//! Best-effort persistence of drawer open/snap state.
//!
//! A drawer with persistence enabled writes a [`PersistedRecord`] on every
//! committed transition and reads it once when it mounts. The record is stored
//! as JSON under a namespaced key: [`STORAGE_PREFIX`] followed by the caller's
//! persist key.
//!
//! ```text
//! drawer-settings  →  {"open":true,"snapPoint":0.5}
//! ```
//!
//! # Failure Modes
//!
//! Persistence never fails the caller. Every error is logged with
//! `tracing::warn!` and degrades to "no prior state":
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | Backend unavailable | Storage disabled, no disk | `load()` → `None`, writes dropped |
//! | Quota exceeded | Backend full | Write dropped |
//! | Parse failure | Corrupt or foreign data | `load()` → `None` |
//! | Missing record | First mount, key changed | `load()` → `None` |

#[cfg(feature = "state-persistence")]
mod file;
mod storage;

use core::fmt;

use serde::{Deserialize, Serialize};

#[cfg(feature = "state-persistence")]
pub use file::FileStorage;
pub use storage::{MemoryStorage, SharedStorage, StorageBackend, StorageError};

/// Fixed namespace prefix for every persisted drawer key.
pub const STORAGE_PREFIX: &str = "drawer-";

/// The persisted state of one drawer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap_point: Option<f32>,
}

/// Caller-supplied persistence key.
///
/// Two drawers sharing a key share persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersistKey {
    key: String,
}

impl PersistKey {
    /// Wrap a caller key.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// The caller key without the namespace prefix.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Whether the key is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.key.trim().is_empty()
    }

    /// The namespaced storage key: `"drawer-" + key`.
    pub fn storage_key(&self) -> String {
        format!("{STORAGE_PREFIX}{}", self.key)
    }
}

impl fmt::Display for PersistKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Reads and writes one drawer's [`PersistedRecord`].
#[derive(Clone)]
pub struct DrawerPersistence {
    storage: SharedStorage,
    key: PersistKey,
    include_snap_point: bool,
}

impl fmt::Debug for DrawerPersistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawerPersistence")
            .field("backend", &self.storage.name())
            .field("key", &self.key)
            .field("include_snap_point", &self.include_snap_point)
            .finish()
    }
}

impl DrawerPersistence {
    /// Create an adapter. When `include_snap_point` is false the snap point is
    /// neither written nor honored on load.
    pub fn new(storage: SharedStorage, key: PersistKey, include_snap_point: bool) -> Self {
        Self {
            storage,
            key,
            include_snap_point,
        }
    }

    /// The caller key.
    pub fn key(&self) -> &PersistKey {
        &self.key
    }

    /// Load the stored record, if a valid one exists.
    pub fn load(&self) -> Option<PersistedRecord> {
        let storage_key = self.key.storage_key();
        let raw = match self.storage.get(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(
                    key = %storage_key,
                    backend = self.storage.name(),
                    error = %err,
                    "Failed to load drawer state"
                );
                return None;
            }
        };

        let mut record: PersistedRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(
                    key = %storage_key,
                    error = %err,
                    "Failed to load drawer state"
                );
                return None;
            }
        };

        if !self.include_snap_point {
            record.snap_point = None;
        }
        if record.snap_point.is_some_and(|p| !p.is_finite()) {
            record.snap_point = None;
        }
        tracing::trace!(key = %storage_key, ?record, "loaded drawer state");
        Some(record)
    }

    /// Store the record for a committed transition.
    pub fn save(&self, open: bool, snap_point: Option<f32>) {
        let record = PersistedRecord {
            open,
            snap_point: snap_point.filter(|_| self.include_snap_point),
        };
        let storage_key = self.key.storage_key();
        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(key = %storage_key, error = %err, "Failed to save drawer state");
                return;
            }
        };
        if let Err(err) = self.storage.set(&storage_key, &json) {
            tracing::warn!(
                key = %storage_key,
                backend = self.storage.name(),
                error = %err,
                "Failed to save drawer state"
            );
        }
    }

    /// Delete the stored record.
    pub fn clear(&self) {
        let storage_key = self.key.storage_key();
        if let Err(err) = self.storage.remove(&storage_key) {
            tracing::warn!(
                key = %storage_key,
                backend = self.storage.name(),
                error = %err,
                "Failed to clear drawer state"
            );
        }
    }
}
