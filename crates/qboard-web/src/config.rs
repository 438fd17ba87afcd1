//! Application configuration
//!
//! Loaded from TOML; every section is optional and falls back to defaults.
//!
//! ```toml
//! bind = "0.0.0.0:8501"
//!
//! [board]
//! worksheet = "Sheet1"
//! freshness_secs = 5
//!
//! [store]
//! backend = "sheets"
//! spreadsheet_id = "1AbC..."
//! token_file = "/run/secrets/QBOARD_SHEETS_TOKEN"
//! ```

use crate::telemetry::LogFormat;
use qboard_core::BoardConfig;
use qboard_sheets::SheetsConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Config path
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Config path
        path: PathBuf,
        /// Parser failure
        #[source]
        source: toml::de::Error,
    },

    /// Bind address could not be parsed
    #[error("invalid bind address '{0}'")]
    Bind(String),
}

/// Row store selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Process-local store; rows are lost on exit
    #[default]
    Memory,
    /// Google Sheets spreadsheet
    Sheets(SheetsConfig),
}

impl StoreConfig {
    /// Backend name for logs
    #[must_use]
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sheets(_) => qboard_sheets::BACKEND,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QBoardConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// Log output format
    pub log_format: LogFormat,
    /// Board behaviour
    pub board: BoardConfig,
    /// Row store backend
    pub store: StoreConfig,
}

impl Default for QBoardConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8501)),
            log_format: LogFormat::default(),
            board: BoardConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl QBoardConfig {
    /// Load from a TOML file
    ///
    /// # Errors
    /// `ConfigError::Read` or `ConfigError::Parse`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override listen address from a string
    ///
    /// # Errors
    /// `ConfigError::Bind` when `addr` is not `host:port`.
    pub fn with_bind_str(mut self, addr: &str) -> Result<Self, ConfigError> {
        self.bind = addr
            .parse()
            .map_err(|_| ConfigError::Bind(addr.to_string()))?;
        Ok(self)
    }

    /// With log format
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }
}
