#![forbid(unsafe_code)]

//! Storage backends for persisted drawer state.
//!
//! A backend is a string key → string value store, the shape of browser local
//! storage. Backends report failures as [`StorageError`]; it is the
//! persistence adapter's job to turn those into warnings.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Errors from storage backends.
#[derive(Debug)]
pub enum StorageError {
    /// The backend cannot be used at all (disabled, private mode, no disk).
    Unavailable(String),
    /// Writing would exceed the backend's size limit.
    QuotaExceeded { key: String, limit: usize },
    /// An I/O operation failed.
    Io(std::io::Error),
    /// Stored data could not be decoded.
    Corrupt(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
            Self::QuotaExceeded { key, limit } => {
                write!(f, "storage quota of {limit} bytes exceeded writing '{key}'")
            }
            Self::Io(err) => write!(f, "storage I/O error: {err}"),
            Self::Corrupt(reason) => write!(f, "corrupt storage: {reason}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// A durable key/value store.
///
/// Methods take `&self`: a backend is shared by every drawer in a document and
/// uses interior mutability.
pub trait StorageBackend {
    /// Read a value. `Ok(None)` means the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Short backend name for log output.
    fn name(&self) -> &'static str;
}

/// Backend shared by the drawers of one document.
pub type SharedStorage = Rc<dyn StorageBackend>;

/// In-process storage.
///
/// Supports an optional byte quota (sum of key and value lengths) and an
/// availability switch so failure paths can be exercised.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
    quota: Option<usize>,
    unavailable: Cell<bool>,
}

impl MemoryStorage {
    /// Unlimited, available storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses writes past `bytes` total.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Toggle availability. While unavailable every operation fails.
    pub fn set_available(&self, available: bool) {
        self.unavailable.set(!available);
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Raw stored value, bypassing availability checks.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Store a raw value, bypassing quota and availability checks.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.borrow_mut().insert(key.into(), value.into());
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.get() {
            Err(StorageError::Unavailable("memory storage disabled".into()))
        } else {
            Ok(())
        }
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        if let Some(limit) = self.quota
            && self.used_bytes_without(key) + key.len() + value.len() > limit
        {
            return Err(StorageError::QuotaExceeded {
                key: key.to_owned(),
                limit,
            });
        }
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
