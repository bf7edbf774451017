//! # Store Subcommands
//!
//! `put`, `get`, `update` and `digest` over the configured backend.
//! Records are read from JSON files holding a transaction pair and are
//! validated before they reach storage.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use orion_core::{Digest, TransactionPair};
use orion_storage::{
    ContentAddressedStorage, ContentType, FileStore, KeyValueStore, MemoryStore, Sha256Digester,
    Storage,
};

use crate::config::{BackendKind, StorageConfig};

/// Storage as assembled from configuration: backend and codec are chosen
/// at runtime.
pub type CliStorage =
    ContentAddressedStorage<TransactionPair, dyn KeyValueStore, ContentType, Sha256Digester>;

/// How `update` writes the new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Read, then write and wait for the write.
    Wait,
    /// Compare-and-swap with bounded retries.
    Atomic,
}

/// Open the backend described by `config`.
pub async fn open_storage(config: &StorageConfig) -> Result<CliStorage> {
    let backend: Arc<dyn KeyValueStore> = match config.backend {
        BackendKind::File => Arc::new(FileStore::open(&config.data_dir).await.with_context(|| {
            format!("failed to open file store at {}", config.data_dir.display())
        })?),
        BackendKind::Memory => Arc::new(MemoryStore::new()),
    };
    tracing::debug!(
        backend = ?config.backend,
        codec = %config.codec,
        data_dir = %config.data_dir.display(),
        "opened storage"
    );
    Ok(ContentAddressedStorage::with_strategies(backend, config.codec, Sha256Digester)
        .with_cas_retries(config.cas_retries))
}

/// Read and validate a transaction pair from a JSON file.
pub fn read_record(file: &Path) -> Result<TransactionPair> {
    if !file.exists() {
        bail!("file not found: {}", file.display());
    }
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read file: {}", file.display()))?;
    let record: TransactionPair = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse transaction pair: {}", file.display()))?;
    record
        .validate()
        .with_context(|| format!("invalid transaction pair: {}", file.display()))?;
    Ok(record)
}

fn parse_digest(text: &str) -> Result<Digest> {
    text.parse::<Digest>()
        .with_context(|| format!("invalid digest: {text:?}"))
}

/// Store the record in `file` and print its digest.
pub async fn cmd_put(storage: &CliStorage, file: &Path, out: &mut dyn Write) -> Result<u8> {
    let record = read_record(file)?;
    let key = storage.put(&record).await.context("put failed")?;
    writeln!(out, "{key}")?;
    Ok(0)
}

/// Print the record stored under `digest` as JSON.
pub async fn cmd_get(storage: &CliStorage, digest: &str, out: &mut dyn Write) -> Result<u8> {
    let key = parse_digest(digest)?;
    match storage.get(&key).await.context("get failed")? {
        Some(record) => {
            writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?;
            Ok(0)
        }
        None => {
            writeln!(out, "NOT FOUND: {key}")?;
            Ok(1)
        }
    }
}

/// Overwrite the entry under `digest` and print the previous record.
pub async fn cmd_update(
    storage: &CliStorage,
    digest: &str,
    file: &Path,
    mode: UpdateMode,
    out: &mut dyn Write,
) -> Result<u8> {
    let key = parse_digest(digest)?;
    let record = read_record(file)?;
    let previous = match mode {
        UpdateMode::Wait => storage.update_and_wait(&key, &record).await,
        UpdateMode::Atomic => storage.update_atomic(&key, &record).await,
    }
    .context("update failed")?;

    match previous {
        Some(previous) => writeln!(out, "{}", serde_json::to_string_pretty(&previous)?)?,
        None => writeln!(out, "OK: created {key}")?,
    }
    Ok(0)
}

/// Print the digest the record in `file` would be stored under.
pub fn cmd_digest(storage: &CliStorage, file: &Path, out: &mut dyn Write) -> Result<u8> {
    let record = read_record(file)?;
    let key = storage
        .generate_digest(&record)
        .context("digest failed")?;
    writeln!(out, "{key}")?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn memory_config() -> StorageConfig {
        StorageConfig {
            backend: BackendKind::Memory,
            ..StorageConfig::default()
        }
    }

    fn write_record(dir: &TempDir, name: &str, payload: &str) -> PathBuf {
        let path = dir.path().join(name);
        let json = serde_json::json!({"from": "A", "to": "B", "payload": payload});
        std::fs::write(&path, json.to_string()).unwrap();
        path
    }

    #[test]
    fn read_record_rejects_missing_file() {
        let err = read_record(Path::new("/nonexistent/record.json")).unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn read_record_rejects_invalid_payload() {
        let dir = TempDir::new().unwrap();
        let path = write_record(&dir, "bad.json", "not-hex");
        assert!(read_record(&path).is_err());
    }

    #[tokio::test]
    async fn put_prints_digest() {
        let dir = TempDir::new().unwrap();
        let storage = open_storage(&memory_config()).await.unwrap();
        let file = write_record(&dir, "r.json", "deadbeef");

        let mut out = Vec::new();
        assert_eq!(cmd_put(&storage, &file, &mut out).await.unwrap(), 0);
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.trim(), "zvw0igQGktX6_xm7osx2rdpd-Es2EUlwJoUaJ3LCNJU");
    }

    #[tokio::test]
    async fn get_missing_exits_one() {
        let storage = open_storage(&memory_config()).await.unwrap();
        let mut out = Vec::new();
        assert_eq!(
            cmd_get(&storage, "nonexistent-key", &mut out).await.unwrap(),
            1
        );
        assert!(String::from_utf8(out).unwrap().starts_with("NOT FOUND"));
    }

    #[tokio::test]
    async fn get_rejects_malformed_digest() {
        let storage = open_storage(&memory_config()).await.unwrap();
        let mut out = Vec::new();
        assert!(cmd_get(&storage, "has space", &mut out).await.is_err());
    }

    #[tokio::test]
    async fn digest_matches_put() {
        let dir = TempDir::new().unwrap();
        let storage = open_storage(&memory_config()).await.unwrap();
        let file = write_record(&dir, "r.json", "cafebabe");

        let mut digest_out = Vec::new();
        cmd_digest(&storage, &file, &mut digest_out).unwrap();
        let mut put_out = Vec::new();
        cmd_put(&storage, &file, &mut put_out).await.unwrap();
        assert_eq!(digest_out, put_out);
    }
}
