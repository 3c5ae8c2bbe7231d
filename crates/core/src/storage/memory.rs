use std::collections::HashMap;
use std::sync::Mutex;

use super::{KeyValueStore, SlotUpdate};
use crate::error::StorageError;

/// In-memory store. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one slot
    pub fn with_slot(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut slots) = store.slots.lock() {
            slots.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self
            .slots
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn update(&self, key: &str, apply: &mut SlotUpdate<'_>) -> Result<String, StorageError> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        let next = apply(slots.get(key).map(String::as_str))?;
        slots.insert(key.to_string(), next.clone());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn test_memory_store_update() {
        let store = MemoryStore::new();

        let written = store
            .update("k", &mut |current| {
                assert_eq!(current, None);
                Ok("a".to_string())
            })
            .unwrap();
        assert_eq!(written, "a");

        store
            .update("k", &mut |current| Ok(format!("{}b", current.unwrap_or(""))))
            .unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("ab"));

        let failed = store.update("k", &mut |_| Err(StorageError::Lock("nope".to_string())));
        assert!(failed.is_err());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("ab"));
    }
}
