//! # orion-storage — Content-Addressed Record Storage
//!
//! Composes three pluggable pieces into one storage protocol:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │          ContentAddressedStorage<T, S, C, D>              │
//! │     generate_digest · put · get · update (Storage<T>)     │
//! ├──────────────────┬──────────────────┬─────────────────────┤
//! │  D: Digester<T>  │    C: Codec      │  S: KeyValueStore   │
//! │  Sha256Digester  │  CborCodec       │  MemoryStore        │
//! │  any Fn(&T)      │  JsonCodec       │  FileStore          │
//! └──────────────────┴──────────────────┴─────────────────────┘
//! ```
//!
//! - **put** derives the key from the record, encodes it and writes it.
//! - **get** reads, and decodes only when the backend has an entry.
//!   Absence is `Ok(None)`; undecodable bytes are an error.
//! - **update** captures the previous value, then writes the new record
//!   under the caller-supplied key without waiting for the write.
//!
//! Encryption is applied before records reach this crate. Storage is
//! indifferent to whether a payload is plaintext or ciphertext.

pub mod codec;
pub mod digester;
pub mod error;
pub mod file;
pub mod kv;
pub mod memory;
pub mod storage;

pub use codec::{CborCodec, Codec, CodecError, ContentType, JsonCodec};
pub use digester::{Digester, Sha256Digester};
pub use error::{BackendError, StorageError};
pub use file::FileStore;
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use storage::{
    ContentAddressedStorage, PrivateTransactionStorage, Storage, StorageStats,
    DEFAULT_CAS_RETRIES,
};
