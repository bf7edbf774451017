//! # Storage Contract and Content-Addressed Implementation
//!
//! [`Storage<T>`] is the interface the rest of a node depends on.
//! [`ContentAddressedStorage`] is its only implementation, parameterised by
//! the backend, the codec and the digest strategy instead of being
//! re-implemented per record type.
//!
//! ## Ordering
//!
//! Within one call, steps run in the order documented on each method.
//! Digesting and encoding are synchronous and happen before the first
//! backend call. Nothing serializes concurrent callers against each other:
//! two `update`s of one key race, the last write wins, and the earlier
//! caller's "previous value" may already be stale when it returns. Use
//! [`update_atomic()`](ContentAddressedStorage::update_atomic) when that
//! race matters.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use orion_core::{Digest, TransactionPair};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, trace, warn};

use crate::codec::{CborCodec, Codec};
use crate::digester::{Digester, Sha256Digester};
use crate::error::StorageError;
use crate::kv::KeyValueStore;

/// Default attempt bound for [`ContentAddressedStorage::update_atomic`].
pub const DEFAULT_CAS_RETRIES: u32 = 8;

/// Asynchronous content-addressed storage of records of type `T`.
///
/// Every operation resolves to a value, to `Ok(None)` for absence, or to a
/// [`StorageError`]. Errors are values on the returned future; nothing
/// panics across the async boundary.
#[async_trait]
pub trait Storage<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Derive the key for `record`. Pure: no I/O, no mutation.
    fn generate_digest(&self, record: &T) -> Result<Digest, StorageError>;

    /// Store `record` under its own digest and resolve with that digest.
    ///
    /// Storing identical content twice writes the same slot twice.
    async fn put(&self, record: &T) -> Result<Digest, StorageError>;

    /// Load the record stored under `key`.
    async fn get(&self, key: &Digest) -> Result<Option<T>, StorageError>;

    /// Overwrite the entry under the caller-supplied `key` with `record`
    /// and resolve with the entry's previous value.
    ///
    /// The key is not recomputed from `record`. The write is not awaited:
    /// the returned future completes once the previous value has been read.
    async fn update(&self, key: &Digest, record: &T) -> Result<Option<T>, StorageError>;
}

/// Counters for storage operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageStats {
    /// Completed `put` writes.
    pub puts: u64,
    /// Reads that found an entry.
    pub hits: u64,
    /// Reads that found nothing.
    pub misses: u64,
    /// Entries that failed to decode.
    pub decode_failures: u64,
    /// Update writes that completed (detached, awaited or swapped).
    pub updates: u64,
    /// Detached update writes that failed.
    pub failed_writes: u64,
    /// Compare-and-swap attempts that lost a race.
    pub cas_conflicts: u64,
}

/// Content-addressed storage over a [`KeyValueStore`].
///
/// - `S` — backend, shared through `Arc` (may be `dyn KeyValueStore`).
/// - `C` — codec for persisted bytes, [`CborCodec`] by default.
/// - `D` — digest strategy, [`Sha256Digester`] by default.
pub struct ContentAddressedStorage<T, S: ?Sized, C = CborCodec, D = Sha256Digester> {
    store: Arc<S>,
    codec: C,
    digester: D,
    cas_retries: u32,
    stats: Arc<RwLock<StorageStats>>,
    _record: PhantomData<fn() -> T>,
}

/// Storage for the node's private transaction pairs.
pub type PrivateTransactionStorage<S> = ContentAddressedStorage<TransactionPair, S>;

impl<T, S: ?Sized> ContentAddressedStorage<T, S> {
    /// Storage with the default CBOR codec and SHA-256 digests.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_strategies(store, CborCodec, Sha256Digester)
    }
}

impl<T, S: ?Sized, C, D> ContentAddressedStorage<T, S, C, D> {
    /// Storage with an injected codec and digest strategy.
    pub fn with_strategies(store: Arc<S>, codec: C, digester: D) -> Self {
        Self {
            store,
            codec,
            digester,
            cas_retries: DEFAULT_CAS_RETRIES,
            stats: Arc::new(RwLock::new(StorageStats::default())),
            _record: PhantomData,
        }
    }

    /// Set the attempt bound for [`update_atomic()`](Self::update_atomic).
    /// Values below 1 are raised to 1.
    pub fn with_cas_retries(mut self, retries: u32) -> Self {
        self.cas_retries = retries.max(1);
        self
    }

    /// Snapshot of operation counters.
    pub fn stats(&self) -> StorageStats {
        self.stats.read().clone()
    }
}

impl<T, S, C, D> ContentAddressedStorage<T, S, C, D>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    S: KeyValueStore + ?Sized + 'static,
    C: Codec,
    D: Digester<T>,
{
    fn encode(&self, record: &T) -> Result<Vec<u8>, StorageError> {
        self.codec
            .encode(record)
            .map_err(|e| StorageError::Serialization {
                content_type: self.codec.content_type(),
                reason: e.to_string(),
            })
    }

    fn decode(&self, key: &Digest, bytes: &[u8]) -> Result<T, StorageError> {
        self.codec.decode(bytes).map_err(|e| {
            self.stats.write().decode_failures += 1;
            warn!(key = %key, content_type = %self.codec.content_type(), "stored entry failed to decode: {e}");
            StorageError::Deserialization {
                key: key.clone(),
                content_type: self.codec.content_type(),
                reason: e.to_string(),
            }
        })
    }

    /// Read and decode, keeping the raw bytes for compare-and-swap.
    async fn load(&self, key: &Digest) -> Result<(Option<Vec<u8>>, Option<T>), StorageError> {
        let raw = self.store.get(key.as_key_bytes()).await?;
        let record = match raw.as_deref() {
            Some(bytes) => {
                let record = self.decode(key, bytes)?;
                self.stats.write().hits += 1;
                trace!(key = %key, bytes = bytes.len(), "entry found");
                Some(record)
            }
            None => {
                self.stats.write().misses += 1;
                trace!(key = %key, "entry not found");
                None
            }
        };
        Ok((raw, record))
    }

    /// Like [`Storage::update`], but resolves only after the new record has
    /// been written.
    pub async fn update_and_wait(&self, key: &Digest, record: &T) -> Result<Option<T>, StorageError> {
        let bytes = self.encode(record)?;
        let (_, previous) = self.load(key).await?;
        self.store.put(key.as_key_bytes(), bytes).await?;
        self.stats.write().updates += 1;
        debug!(key = %key, had_previous = previous.is_some(), "update written");
        Ok(previous)
    }

    /// Read-then-write as a single compare-and-swap on the backend.
    ///
    /// The write only lands if the entry is still the one that was read;
    /// otherwise the read is repeated, up to the configured attempt bound.
    /// Resolves with the value that was actually replaced.
    ///
    /// # Errors
    ///
    /// [`StorageError::Conflict`] once every attempt has lost a race.
    pub async fn update_atomic(&self, key: &Digest, record: &T) -> Result<Option<T>, StorageError> {
        let bytes = self.encode(record)?;
        for attempt in 1..=self.cas_retries {
            let (current, previous) = self.load(key).await?;
            let swapped = self
                .store
                .compare_and_swap(key.as_key_bytes(), current.as_deref(), bytes.clone())
                .await?;
            if swapped {
                self.stats.write().updates += 1;
                debug!(key = %key, attempt, "atomic update written");
                return Ok(previous);
            }
            self.stats.write().cas_conflicts += 1;
            debug!(key = %key, attempt, "atomic update lost a race; retrying");
        }
        warn!(key = %key, attempts = self.cas_retries, "atomic update gave up");
        Err(StorageError::Conflict {
            key: key.clone(),
            attempts: self.cas_retries,
        })
    }
}

#[async_trait]
impl<T, S, C, D> Storage<T> for ContentAddressedStorage<T, S, C, D>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    S: KeyValueStore + ?Sized + 'static,
    C: Codec,
    D: Digester<T>,
{
    fn generate_digest(&self, record: &T) -> Result<Digest, StorageError> {
        Ok(self.digester.digest(record)?)
    }

    async fn put(&self, record: &T) -> Result<Digest, StorageError> {
        let key = self.generate_digest(record)?;
        let bytes = self.encode(record)?;
        let len = bytes.len();
        self.store.put(key.as_key_bytes(), bytes).await?;
        self.stats.write().puts += 1;
        debug!(key = %key, bytes = len, content_type = %self.codec.content_type(), "stored record");
        Ok(key)
    }

    async fn get(&self, key: &Digest) -> Result<Option<T>, StorageError> {
        let (_, record) = self.load(key).await?;
        Ok(record)
    }

    async fn update(&self, key: &Digest, record: &T) -> Result<Option<T>, StorageError> {
        // Encode first so an unencodable record fails the call itself.
        let bytes = self.encode(record)?;
        let (_, previous) = self.load(key).await?;

        let store = Arc::clone(&self.store);
        let stats = Arc::clone(&self.stats);
        let key_owned = key.clone();
        let write = async move {
            match store.put(key_owned.as_key_bytes(), bytes).await {
                Ok(()) => {
                    stats.write().updates += 1;
                    debug!(key = %key_owned, "detached update written");
                }
                Err(e) => {
                    stats.write().failed_writes += 1;
                    error!(key = %key_owned, "detached update write failed: {e}");
                }
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(write);
            }
            Err(_) => {
                trace!(key = %key, "no tokio runtime; writing update inline");
                write.await;
            }
        }

        Ok(previous)
    }
}
