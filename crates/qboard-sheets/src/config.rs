//! Sheets backend configuration.

use crate::error::SheetsError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Public Sheets API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// Connection settings for one spreadsheet.
///
/// The access token is never part of the config itself; it lives in
/// `token_file` (a mounted secret). OAuth access tokens expire after about an
/// hour, so the file is re-read for every request: whatever refreshes the
/// secret (a sidecar, a cron job) only has to rewrite the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet document id (from its URL).
    pub spreadsheet_id: String,
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// File holding an OAuth bearer token.
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Header rows above the data.
    #[serde(default = "default_header_rows")]
    pub header_rows: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_token_file() -> PathBuf {
    PathBuf::from("/run/secrets/QBOARD_SHEETS_TOKEN")
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_header_rows() -> u32 {
    1
}

impl SheetsConfig {
    /// Config for a spreadsheet with default endpoint and secret path.
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            base_url: default_base_url(),
            token_file: default_token_file(),
            timeout_secs: default_timeout_secs(),
            header_rows: default_header_rows(),
        }
    }

    /// With API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With token file.
    #[must_use]
    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = path.into();
        self
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// First worksheet row holding data (1-based).
    pub fn first_data_row(&self) -> u32 {
        self.header_rows + 1
    }

    /// Read the bearer token from `token_file`, trimmed.
    pub fn read_token(&self) -> Result<String, SheetsError> {
        read_token_file(&self.token_file)
    }
}

/// Read a bearer token from `path`, trimmed; empty files are an error.
pub fn read_token_file(path: &Path) -> Result<String, SheetsError> {
    let token = std::fs::read_to_string(path).map_err(|e| {
        SheetsError::config(format!("failed to read token file {}: {e}", path.display()))
    })?;

    let token = token.trim();
    if token.is_empty() {
        return Err(SheetsError::config(format!(
            "token file {} is empty",
            path.display()
        )));
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn token_is_trimmed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  ya29.token  ").unwrap();

        let config = SheetsConfig::new("doc").with_token_file(file.path());
        assert_eq!(config.read_token().unwrap(), "ya29.token");
    }

    #[test]
    fn missing_or_empty_token_is_config_error() {
        let config = SheetsConfig::new("doc").with_token_file("/nonexistent/token");
        assert!(matches!(config.read_token(), Err(SheetsError::Config(_))));

        let file = tempfile::NamedTempFile::new().unwrap();
        let config = SheetsConfig::new("doc").with_token_file(file.path());
        assert!(matches!(config.read_token(), Err(SheetsError::Config(_))));
    }

    #[test]
    fn defaults() {
        let config = SheetsConfig::new("doc");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.first_data_row(), 2);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }
}
