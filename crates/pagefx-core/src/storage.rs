#![forbid(unsafe_code)]

//! Persistent key-value storage (`localStorage` and friends).

use ahash::AHashMap;
use thiserror::Error;

/// Failure reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backend is not available (private mode, disabled storage, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the write (quota, security).
    #[error("storage write rejected for key {key}: {reason}")]
    WriteRejected { key: String, reason: String },
}

/// String key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store. Optionally read-only, to exercise write failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: AHashMap<String, String>,
    read_only: bool,
    writes: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }

    /// Store that rejects every write.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    /// Number of successful writes.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Raw lookup without the `Result` wrapper.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::WriteRejected {
                key: key.to_string(),
                reason: "store is read-only".to_string(),
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("theme"), Ok(None));
    }

    #[test]
    fn set_then_get() {
        let mut store = MemoryStore::new();
        store.set("theme", "light").expect("write");
        assert_eq!(store.get("theme"), Ok(Some("light".to_string())));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn read_only_rejects_writes() {
        let mut store = MemoryStore::read_only();
        let err = store.set("theme", "light").expect_err("read-only");
        assert!(err.to_string().contains("theme"));
        assert_eq!(store.peek("theme"), None);
    }
}
