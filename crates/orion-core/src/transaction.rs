//! # Transaction Pairs
//!
//! The record type persisted by an Orion node: a private transaction
//! payload together with the sending and receiving parties. Encryption of
//! the payload happens upstream; by the time a pair reaches storage the
//! payload is an opaque hex string.

use serde::{Deserialize, Serialize};

use crate::error::OrionError;

/// A private transaction payload paired with its parties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionPair {
    /// Sending party identifier.
    pub from: String,
    /// Receiving party identifier.
    pub to: String,
    /// Hex-encoded payload bytes.
    pub payload: String,
}

impl TransactionPair {
    /// Build a pair from its parts.
    pub fn new(from: impl Into<String>, to: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            payload: payload.into(),
        }
    }

    /// Check the structural rules a stored pair must satisfy.
    ///
    /// Both parties must be named and the payload must be non-empty,
    /// even-length hex.
    pub fn validate(&self) -> Result<(), OrionError> {
        if self.from.trim().is_empty() {
            return Err(OrionError::InvalidRecord("from is required".into()));
        }
        if self.to.trim().is_empty() {
            return Err(OrionError::InvalidRecord("to is required".into()));
        }
        if self.payload.is_empty() {
            return Err(OrionError::InvalidRecord("payload is required".into()));
        }
        if self.payload.len() % 2 != 0 {
            return Err(OrionError::InvalidRecord(format!(
                "payload hex has odd length: {}",
                self.payload.len()
            )));
        }
        if !self.payload.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(OrionError::InvalidRecord(
                "payload contains non-hex characters".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_field_names() {
        let pair = TransactionPair::new("A", "B", "deadbeef");
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"from": "A", "to": "B", "payload": "deadbeef"})
        );
    }

    #[test]
    fn validate_accepts_hex_payload() {
        assert!(TransactionPair::new("A", "B", "DeadBeef").validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_parties() {
        assert!(TransactionPair::new("", "B", "00").validate().is_err());
        assert!(TransactionPair::new("A", "  ", "00").validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_payload() {
        assert!(TransactionPair::new("A", "B", "").validate().is_err());
        assert!(TransactionPair::new("A", "B", "abc").validate().is_err());
        assert!(TransactionPair::new("A", "B", "zz").validate().is_err());
    }
}
