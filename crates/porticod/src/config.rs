//! portico.toml parsing.
//!
//! All sections are optional; an empty file is a valid config.

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PorticoConfig {
    pub server: Option<ServerConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, e.g. "127.0.0.1:8080".
    pub addr: Option<SocketAddr>,
    /// Value for the `Server` response header.
    pub server_header: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log one line per served response.
    pub access_log: Option<bool>,
    /// tracing env-filter directive, overridden by RUST_LOG.
    pub filter: Option<String>,
}

impl PorticoConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PorticoConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().and_then(|s| s.addr)
    }

    pub fn server_header(&self) -> Option<&str> {
        self.server
            .as_ref()
            .and_then(|s| s.server_header.as_deref())
    }

    pub fn access_log(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.access_log)
            .unwrap_or(false)
    }

    pub fn log_filter(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.filter.as_deref())
    }
}
