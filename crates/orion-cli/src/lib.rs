//! # orion-cli — Orion Storage Command-Line Interface
//!
//! ## Subcommands
//!
//! - `put` — store a transaction pair, print its digest
//! - `get` — load a transaction pair by digest
//! - `update` — overwrite the entry under a digest
//! - `digest` — compute a record's digest without storing it
//! - `transport` — show the configured transport mode
//!
//! Argument parsing lives in `main.rs`. Handlers here take resolved inputs
//! and return an exit code: 0 success, 1 not found. Errors propagate as
//! `anyhow::Error` and become exit code 2 in `main`.

pub mod config;
pub mod store;
pub mod transport;

pub use config::{BackendKind, ConfigError, OrionConfig, StorageConfig};
pub use transport::{TransportMode, TransportSettings};
