//! # Content Digests and Storage Keys
//!
//! Two related types live here:
//!
//! - [`ContentDigest`] — the raw 32-byte hash of a record's canonical bytes,
//!   tagged with the algorithm that produced it.
//! - [`Digest`] — the printable handle callers receive from `put` and pass
//!   back to `get`/`update`. The default encoding of a `ContentDigest` is
//!   unpadded URL-safe base64, which is 43 characters for SHA-256.
//!
//! ## Collision resistance
//!
//! Keys are full 256-bit SHA-256 outputs. Two distinct records share a key
//! only on a SHA-256 collision (generic attack cost 2^128), so a key slot is
//! treated as belonging to exactly one content.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::DigestError;

/// Upper bound on the length of a [`Digest`] in bytes.
pub const MAX_DIGEST_LEN: usize = 512;

/// The hash algorithm used to produce a content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256 over canonical record bytes.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content hash with its algorithm tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Create a new content digest from raw bytes and algorithm.
    ///
    /// Prefer [`sha256_digest()`] when starting from a record.
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Encode as a storage key: unpadded URL-safe base64.
    pub fn to_key(&self) -> Digest {
        Digest(URL_SAFE_NO_PAD.encode(self.bytes))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// Only `&CanonicalBytes` is accepted, so every digest in the system is
/// computed over the same canonical form of a record.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest::new(DigestAlgorithm::Sha256, bytes)
}

/// A printable storage key.
///
/// Usually produced by a digest strategy, but callers may also hold keys
/// they received out of band, so any printable token is accepted: non-empty,
/// at most [`MAX_DIGEST_LEN`] bytes, no whitespace or control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

impl Digest {
    /// Validate and wrap a key string.
    pub fn new(s: impl Into<String>) -> Result<Self, DigestError> {
        let s = s.into();
        if s.is_empty() {
            return Err(DigestError::Empty);
        }
        if s.len() > MAX_DIGEST_LEN {
            return Err(DigestError::TooLong {
                len: s.len(),
                max: MAX_DIGEST_LEN,
            });
        }
        if let Some(c) = s.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(DigestError::InvalidCharacter(c));
        }
        Ok(Self(s))
    }

    /// The key as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The UTF-8 bytes handed to the key-value backend.
    pub fn as_key_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Digest {
    type Error = DigestError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Digest> for String {
    fn from(d: Digest) -> Self {
        d.0
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
