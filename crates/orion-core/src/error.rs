//! # Error Types
//!
//! Structured errors shared by the Orion crates. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Top-level error type for `orion-core`.
#[derive(Error, Debug)]
pub enum OrionError {
    /// A record failed a structural check.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Non-integral numbers have no stable canonical rendering.
    #[error("float values are not permitted in canonical records: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error while producing or parsing a storage key.
#[derive(Error, Debug)]
pub enum DigestError {
    /// Storage keys must not be empty.
    #[error("digest is empty")]
    Empty,

    /// Storage key exceeds the length bound.
    #[error("digest too long: {len} bytes (max {max})")]
    TooLong {
        /// Actual length in bytes.
        len: usize,
        /// Maximum permitted length.
        max: usize,
    },

    /// Storage keys must be printable and whitespace-free.
    #[error("digest contains invalid character {0:?}")]
    InvalidCharacter(char),

    /// The record could not be canonicalized for hashing.
    #[error("cannot digest record: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A custom digest strategy failed.
    #[error("digest strategy failed: {0}")]
    Strategy(String),
}
