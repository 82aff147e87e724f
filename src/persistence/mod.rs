//! Key/value persistence for records and settings
//!
//! Features:
//! - One JSON value per key, written whole (never partially)
//! - LocalStorage on the web, tmp-then-rename files natively
//! - In-memory backend for tests and headless runs
//!
//! Callers treat unreadable data as absent and never retry failed writes.

use std::collections::HashMap;
use std::fmt;

#[cfg(target_arch = "wasm32")]
mod web;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

/// Why a write did not land
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No storage is available (private browsing, missing window, ...)
    Unavailable,
    /// Filesystem failure
    Io(String),
    /// The backend refused the value (quota exceeded, ...)
    Rejected(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::Io(msg) => write!(f, "storage i/o error: {msg}"),
            Self::Rejected(msg) => write!(f, "storage rejected write: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Durable string storage keyed by stable identifiers
pub trait Storage {
    /// Stored value for `key`, or `None` when absent or unreadable
    fn read(&self, key: &str) -> Option<String>;

    /// Replace the value for `key` in one step
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Volatile storage, used by tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
    /// When set, every write fails with `Unavailable`
    pub read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses every write, like a full or disabled LocalStorage
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Unavailable);
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let mut storage = MemoryStorage::new();
        assert!(storage.read("missing").is_none());
        storage.write("k", "1").unwrap();
        storage.write("k", "2").unwrap();
        assert_eq!(storage.read("k").as_deref(), Some("2"));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_read_only_storage_rejects_writes() {
        let mut storage = MemoryStorage::read_only();
        assert_eq!(storage.write("k", "1"), Err(StorageError::Unavailable));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(StorageError::Unavailable.to_string(), "storage unavailable");
        assert_eq!(
            StorageError::Io("disk full".into()).to_string(),
            "storage i/o error: disk full"
        );
    }
}
