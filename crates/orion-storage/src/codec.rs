//! # Record Codecs
//!
//! A codec turns a record into bytes and back under a named content type.
//! Codecs are stateless; the storage layer holds one by value.
//!
//! `ContentType` itself implements [`Codec`] by dispatching on the variant,
//! which is how a codec chosen at runtime (from configuration) is plugged
//! into the otherwise statically-typed storage.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure inside a codec.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The record could not be encoded.
    #[error("encode failed: {0}")]
    Encode(String),
    /// The bytes could not be decoded into the target type.
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Named wire formats for stored records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Concise Binary Object Representation (RFC 8949).
    #[default]
    Cbor,
    /// JSON (RFC 8259).
    Json,
}

impl ContentType {
    /// The MIME type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cbor => "application/cbor",
            Self::Json => "application/json",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cbor" | "application/cbor" => Ok(Self::Cbor),
            "json" | "application/json" => Ok(Self::Json),
            other => Err(format!("unknown content type: {other:?} (expected cbor or json)")),
        }
    }
}

/// Stateless record serializer.
pub trait Codec: Send + Sync + 'static {
    /// The content type this codec reads and writes.
    fn content_type(&self) -> ContentType;

    /// Encode a record.
    fn encode<T: Serialize>(&self, record: &T) -> Result<Vec<u8>, CodecError>;

    /// Decode a record. Fails on structurally invalid bytes, including
    /// well-formed data that is missing fields of `T`.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;
}

/// CBOR codec backed by `ciborium`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborCodec;

impl Codec for CborCodec {
    fn content_type(&self) -> ContentType {
        ContentType::Cbor
    }

    fn encode<T: Serialize>(&self, record: &T) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        ciborium::into_writer(record, &mut out).map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(out)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        ciborium::from_reader(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> ContentType {
        ContentType::Json
    }

    fn encode<T: Serialize>(&self, record: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(record).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

impl Codec for ContentType {
    fn content_type(&self) -> ContentType {
        *self
    }

    fn encode<T: Serialize>(&self, record: &T) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Cbor => CborCodec.encode(record),
            Self::Json => JsonCodec.encode(record),
        }
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        match self {
            Self::Cbor => CborCodec.decode(bytes),
            Self::Json => JsonCodec.decode(bytes),
        }
    }
}
