//! In-process key-value backend.
//!
//! Entries live in a `HashMap` behind a `parking_lot::RwLock`. The lock is
//! never held across an `.await`, so the async methods complete without
//! suspending.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::trace;

use crate::error::BackendError;
use crate::kv::KeyValueStore;

/// Thread-safe, cloneable in-memory backend. Clones share entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an entry exists under `key`.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.entries.read().contains_key(key)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn put(&self, key: &[u8], value: Vec<u8>) -> Result<(), BackendError> {
        trace!(key_len = key.len(), value_len = value.len(), "memory put");
        self.entries.write().insert(key.to_vec(), value);
        Ok(())
    }

    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn compare_and_swap(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        value: Vec<u8>,
    ) -> Result<bool, BackendError> {
        let mut guard = self.entries.write();
        if guard.get(key).map(Vec::as_slice) != expected {
            return Ok(false);
        }
        guard.insert(key.to_vec(), value);
        Ok(true)
    }
}
