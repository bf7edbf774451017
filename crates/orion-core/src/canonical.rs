//! # Canonical Record Bytes
//!
//! `CanonicalBytes` is the only input accepted by the digest functions in
//! this crate. Records are converted to a JSON value tree, checked for
//! values that have no stable textual form, and written out with the JSON
//! Canonicalization Scheme (RFC 8785): sorted object keys, compact
//! separators, UTF-8 output.
//!
//! Two records that are logically equal therefore hash identically, no
//! matter which codec later persists them or in which order their fields
//! were declared.
//!
//! ## Rejected values
//!
//! Non-integral numbers are rejected. Their JCS rendering depends on
//! shortest round-trip formatting, which is not something a storage key
//! should hinge on. Payload amounts belong in strings or integers.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced by JCS canonicalization of a float-free value.
///
/// # Invariants
///
/// - Constructed only through [`CanonicalBytes::new()`] or
///   [`CanonicalBytes::from_value()`].
/// - Object keys are sorted; separators are compact.
/// - No non-integral numbers appear anywhere in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable record.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::FloatRejected`] if the record contains
    /// a non-integral number, or [`CanonicalizationError::SerializationFailed`]
    /// if the record cannot be represented as JSON at all (for example a map
    /// with non-string keys).
    pub fn new(record: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(record)?;
        Self::from_value(value)
    }

    /// Canonicalize an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, CanonicalizationError> {
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Walk the value tree and fail on the first non-integral number.
fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                return Ok(());
            }
            match n.as_f64() {
                Some(f) => Err(CanonicalizationError::FloatRejected(f)),
                None => Ok(()),
            }
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
    }
}
