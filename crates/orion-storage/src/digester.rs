//! # Digest Strategies
//!
//! The storage layer does not hardcode how a record becomes a key. It holds
//! a [`Digester`], which must be pure and deterministic: the same record
//! yields the same key on every call, with no I/O.
//!
//! [`Sha256Digester`] is the default. Any closure
//! `Fn(&T) -> Result<Digest, DigestError>` is also a digester, which is
//! convenient for tests and for record types with a natural identifier.

use orion_core::{sha256_digest, CanonicalBytes, Digest, DigestError};
use serde::Serialize;

/// Derives a storage key from a record.
pub trait Digester<T>: Send + Sync + 'static {
    /// Compute the key for `record`.
    fn digest(&self, record: &T) -> Result<Digest, DigestError>;
}

/// SHA-256 over the record's canonical bytes, encoded as unpadded
/// URL-safe base64.
///
/// The canonical form is independent of the persistence codec, so a record
/// keeps its key whether it is stored as CBOR or JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digester;

impl<T: Serialize> Digester<T> for Sha256Digester {
    fn digest(&self, record: &T) -> Result<Digest, DigestError> {
        let canonical = CanonicalBytes::new(record)?;
        Ok(sha256_digest(&canonical).to_key())
    }
}

impl<T, F> Digester<T> for F
where
    F: Fn(&T) -> Result<Digest, DigestError> + Send + Sync + 'static,
{
    fn digest(&self, record: &T) -> Result<Digest, DigestError> {
        self(record)
    }
}
