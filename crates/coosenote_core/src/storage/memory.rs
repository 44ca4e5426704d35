//! In-memory key-value adapter.
//!
//! # Responsibility
//! - Provide a dependency-free `PersistenceAdapter` for tests and embedding
//!   hosts without durable storage.
//!
//! # Invariants
//! - Values survive only for the adapter's lifetime.

use super::{PersistenceAdapter, StorageResult};
use std::collections::BTreeMap;

/// Map-backed adapter; every instance is an isolated store.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    entries: BTreeMap<String, String>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether any value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryAdapter;
    use crate::storage::PersistenceAdapter;

    #[test]
    fn set_then_get_returns_value() {
        let mut adapter = MemoryAdapter::new();
        adapter.set("k", "v1").expect("set should succeed");
        adapter.set("k", "v2").expect("overwrite should succeed");
        assert_eq!(adapter.get("k").expect("get should succeed").as_deref(), Some("v2"));
    }

    #[test]
    fn get_missing_key_returns_none() {
        let adapter = MemoryAdapter::new();
        assert!(adapter.get("absent").expect("get should succeed").is_none());
    }
}
