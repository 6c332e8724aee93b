//! Browser-local key-value storage.
//!
//! The page persists exactly one value (the theme flag), but the store is a
//! trait so the theme logic runs the same against `localStorage` in the
//! browser and [`MemoryStore`] everywhere else.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    /// No storage area exists (disabled cookies, sandboxed iframe).
    #[error("storage is unavailable")]
    Unavailable,
    /// The platform refused the write (quota exceeded, private mode).
    #[error("storage rejected write: {0}")]
    Rejected(String),
}

pub trait KeyValueStore {
    /// Stored value for `key`. Unreadable storage reads as absent.
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store. Clones share the same map, which is how tests model a
/// page reload: a fresh document mounted over the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one entry.
    pub fn with(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_reads_absent() {
        assert_eq!(MemoryStore::new().get("theme"), None);
    }

    #[test]
    fn set_then_get() {
        let store = MemoryStore::new();
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clones_share_entries() {
        let store = MemoryStore::with("theme", "light");
        let reloaded = store.clone();
        store.set("theme", "dark").unwrap();
        assert_eq!(reloaded.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn error_messages() {
        let unavailable = StorageError::Unavailable.to_string();
        assert_eq!(unavailable, "storage is unavailable");
        assert!(
            StorageError::Rejected("QuotaExceededError".into())
                .to_string()
                .contains("QuotaExceededError")
        );
    }
}
