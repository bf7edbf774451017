//! Listener settings for the node's HTTP surface.
//!
//! A node listens on exactly one of a Unix domain socket, a plain HTTP port
//! or an HTTPS port. The settings keep all three optional so they can be
//! filled from YAML and environment overrides; [`TransportSettings::mode`]
//! resolves them into the single [`TransportMode`] in effect.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Raw transport configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    pub domain_socket_path: Option<PathBuf>,
    pub http_port: Option<u16>,
    pub https_port: Option<u16>,
}

/// The resolved listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportMode {
    DomainSocket(PathBuf),
    Http(u16),
    Https(u16),
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DomainSocket(path) => write!(f, "unix:{}", path.display()),
            Self::Http(port) => write!(f, "http://0.0.0.0:{port}"),
            Self::Https(port) => write!(f, "https://0.0.0.0:{port}"),
        }
    }
}

impl TransportSettings {
    pub fn domain_socket(path: impl Into<PathBuf>) -> Self {
        Self {
            domain_socket_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn http(port: u16) -> Self {
        Self {
            http_port: Some(port),
            ..Self::default()
        }
    }

    pub fn https(port: u16) -> Self {
        Self {
            https_port: Some(port),
            ..Self::default()
        }
    }

    pub fn is_domain_socket(&self) -> bool {
        self.domain_socket_path.is_some()
    }

    pub fn is_http(&self) -> bool {
        self.http_port.is_some()
    }

    pub fn is_https(&self) -> bool {
        self.https_port.is_some()
    }

    /// Resolve the single listener these settings describe.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoTransport`] when nothing is set and
    /// [`ConfigError::AmbiguousTransport`] when more than one value is.
    pub fn mode(&self) -> Result<TransportMode, ConfigError> {
        let mut set = Vec::new();
        if self.is_domain_socket() {
            set.push("domain_socket_path");
        }
        if self.is_http() {
            set.push("http_port");
        }
        if self.is_https() {
            set.push("https_port");
        }
        if set.len() > 1 {
            return Err(ConfigError::AmbiguousTransport(set.join(", ")));
        }

        match (&self.domain_socket_path, self.http_port, self.https_port) {
            (Some(path), None, None) => Ok(TransportMode::DomainSocket(path.clone())),
            (None, Some(port), None) => Ok(TransportMode::Http(port)),
            (None, None, Some(port)) => Ok(TransportMode::Https(port)),
            _ => Err(ConfigError::NoTransport),
        }
    }
}
