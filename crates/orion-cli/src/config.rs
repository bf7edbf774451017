//! Node configuration.
//!
//! Loaded from an optional YAML file, then overridden from the environment:
//!
//! - `ORION_DATA_DIR` — storage root directory
//! - `ORION_BACKEND` — `file` or `memory`
//! - `ORION_CODEC` — `cbor` or `json` (MIME strings accepted)
//! - `ORION_HTTP_PORT`, `ORION_HTTPS_PORT` — listener ports
//! - `ORION_DOMAIN_SOCKET` — listener socket path
//!
//! Missing sections and fields take their defaults.

use std::path::{Path, PathBuf};

use orion_storage::{ContentType, DEFAULT_CAS_RETRIES};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transport::TransportSettings;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidOverride {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("no transport configured (set one of domain_socket_path, http_port, https_port)")]
    NoTransport,
    #[error("more than one transport configured: {0}")]
    AmbiguousTransport(String),
}

/// Which key-value backend holds entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    File,
    Memory,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown backend: {other:?} (expected file or memory)")),
        }
    }
}

/// The `storage` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: BackendKind,
    pub data_dir: PathBuf,
    pub codec: ContentType,
    /// Attempt bound for atomic updates.
    pub cas_retries: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::File,
            data_dir: PathBuf::from("data"),
            codec: ContentType::Cbor,
            cas_retries: DEFAULT_CAS_RETRIES,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrionConfig {
    pub storage: StorageConfig,
    pub transport: TransportSettings,
}

impl OrionConfig {
    /// Load from `path` (or defaults when `None`), then apply process
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Parse a YAML file without applying overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("ORION_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup("ORION_BACKEND") {
            self.storage.backend = parse_override("ORION_BACKEND", value)?;
        }
        if let Some(value) = lookup("ORION_CODEC") {
            self.storage.codec = parse_override("ORION_CODEC", value)?;
        }
        if let Some(value) = lookup("ORION_HTTP_PORT") {
            self.transport.http_port = Some(parse_override("ORION_HTTP_PORT", value)?);
        }
        if let Some(value) = lookup("ORION_HTTPS_PORT") {
            self.transport.https_port = Some(parse_override("ORION_HTTPS_PORT", value)?);
        }
        if let Some(path) = lookup("ORION_DOMAIN_SOCKET") {
            self.transport.domain_socket_path = Some(PathBuf::from(path));
        }
        Ok(())
    }
}

fn parse_override<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidOverride {
            var,
            reason: e.to_string(),
            value,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let config = OrionConfig::default();
        assert_eq!(config.storage.backend, BackendKind::File);
        assert_eq!(config.storage.codec, ContentType::Cbor);
        assert_eq!(config.storage.cas_retries, DEFAULT_CAS_RETRIES);
        assert_eq!(config.transport, TransportSettings::default());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: OrionConfig = serde_yaml::from_str("storage:\n  codec: json\n").unwrap();
        assert_eq!(config.storage.codec, ContentType::Json);
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn overrides_apply() {
        let mut config = OrionConfig::default();
        config
            .apply_overrides(env(&[
                ("ORION_DATA_DIR", "/var/orion"),
                ("ORION_BACKEND", "memory"),
                ("ORION_CODEC", "application/json"),
                ("ORION_HTTP_PORT", "8080"),
            ]))
            .unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/orion"));
        assert_eq!(config.storage.backend, BackendKind::Memory);
        assert_eq!(config.storage.codec, ContentType::Json);
        assert_eq!(config.transport.http_port, Some(8080));
    }

    #[test]
    fn invalid_override_names_variable() {
        let mut config = OrionConfig::default();
        let err = config
            .apply_overrides(env(&[("ORION_HTTPS_PORT", "not-a-port")]))
            .unwrap_err();
        match err {
            ConfigError::InvalidOverride { var, value, .. } => {
                assert_eq!(var, "ORION_HTTPS_PORT");
                assert_eq!(value, "not-a-port");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_codec_override_is_rejected() {
        let mut config = OrionConfig::default();
        assert!(config
            .apply_overrides(env(&[("ORION_CODEC", "xml")]))
            .is_err());
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = OrionConfig::from_file(Path::new("/nonexistent/orion.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
