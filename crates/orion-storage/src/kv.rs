//! # Key-Value Backend Contract
//!
//! The byte-oriented store that storage delegates all persistence to.
//! Keys and values are raw bytes; all encoding happens above this trait.
//!
//! Implementations own their durability, retry and timeout policy. The
//! only consistency guarantee the storage layer relies on is per-key write
//! atomicity: a concurrent reader sees either the old value or the new one.

use async_trait::async_trait;

use crate::error::BackendError;

/// Asynchronous byte-key → byte-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Write `value` under `key`, replacing any existing entry.
    async fn put(&self, key: &[u8], value: Vec<u8>) -> Result<(), BackendError>;

    /// Read the entry under `key`. `Ok(None)` when absent.
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError>;

    /// Write `value` only if the current entry equals `expected`
    /// (`None` meaning "no entry"). Returns whether the write happened.
    ///
    /// The comparison and the write form one atomic step with respect to
    /// other writers on the same store.
    async fn compare_and_swap(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        value: Vec<u8>,
    ) -> Result<bool, BackendError>;
}
