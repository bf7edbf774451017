//! # orion-core — Foundational Types for Orion Storage
//!
//! This crate holds the types every other Orion crate agrees on: how a
//! record becomes bytes for hashing, how those bytes become a content
//! digest, and how a digest becomes a printable storage key.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Every digest is computed over bytes
//!    produced by `CanonicalBytes::new()`. Field order, whitespace and the
//!    codec used for persistence cannot change a record's digest.
//!
//! 2. **`sha256_digest()` accepts only `&CanonicalBytes`.** Raw byte slices
//!    cannot be hashed into a `ContentDigest` by accident.
//!
//! 3. **`Digest` is validated text.** Storage keys are printable, bounded,
//!    whitespace-free strings. They are encoded as UTF-8 when handed to a
//!    key-value backend.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `orion-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod transaction;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest, Digest, DigestAlgorithm, MAX_DIGEST_LEN};
pub use error::{CanonicalizationError, DigestError, OrionError};
pub use transaction::TransactionPair;
