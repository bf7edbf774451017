//! # Storage Error Types
//!
//! Every storage operation resolves to one of three outcomes: a value,
//! `Ok(None)` for absence, or one of the errors below. Absence is never an
//! error, and an undecodable entry is never reported as absence.

use orion_core::{Digest, DigestError};
use thiserror::Error;

use crate::codec::ContentType;

/// Errors surfaced by [`Storage`](crate::Storage) operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The record could not be encoded. Raised before any backend call.
    #[error("failed to serialize record as {content_type}: {reason}")]
    Serialization {
        /// Codec that rejected the record.
        content_type: ContentType,
        /// Codec error message.
        reason: String,
    },

    /// The backend returned bytes that do not decode to the record type.
    #[error("stored entry {key} is not a valid {content_type} record: {reason}")]
    Deserialization {
        /// Key whose entry failed to decode.
        key: Digest,
        /// Codec used for decoding.
        content_type: ContentType,
        /// Codec error message.
        reason: String,
    },

    /// The digest strategy rejected the record.
    #[error("digest error: {0}")]
    Digest(#[from] DigestError),

    /// The key-value backend failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// A compare-and-swap update lost every race it entered.
    #[error("update of {key} conflicted on all {attempts} attempts")]
    Conflict {
        /// Key being updated.
        key: Digest,
        /// Number of attempts made.
        attempts: u32,
    },
}

impl StorageError {
    /// True for failures raised before the backend was touched.
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. } | Self::Digest(_))
    }
}

/// Errors reported by a [`KeyValueStore`](crate::KeyValueStore).
#[derive(Error, Debug)]
pub enum BackendError {
    /// Filesystem or device I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend cannot serve requests.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}
