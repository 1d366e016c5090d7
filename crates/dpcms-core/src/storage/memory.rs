//! In-memory slot storage
//!
//! Nothing survives the process. Backs repositories built with
//! [`Repository::new`](crate::Repository::new) in tests and embedders that
//! want no files on disk.

use std::collections::HashMap;

use super::{KeyValueStore, StorageResult};

/// Slots held in a `HashMap`
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    slots: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots currently written
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.slots.remove(key);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
