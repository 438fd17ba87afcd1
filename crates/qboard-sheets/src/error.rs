//! Error types for the Sheets backend.

use qboard_core::{StoreError, WorksheetId};
use std::time::Duration;
use thiserror::Error;

/// Backend tag used in store errors and logs.
pub const BACKEND: &str = "sheets";

/// Errors from the Sheets REST API.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Non-success HTTP status, with Google's error message when present.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Request did not complete in time.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// HTTP/network error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Worksheet title missing from the spreadsheet.
    #[error("worksheet not found: {0}")]
    WorksheetNotFound(WorksheetId),

    /// Header row holds something other than column labels.
    #[error("unexpected header row: {0}")]
    HeaderMismatch(String),

    /// Configuration error (missing token, bad URL, etc.).
    #[error("configuration error: {0}")]
    Config(String),
}

impl SheetsError {
    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Get a short error code for logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Status { .. } => "http_status",
            Self::Timeout(_) => "timeout",
            Self::Http(_) => "http_error",
            Self::Decode(_) => "decode_error",
            Self::WorksheetNotFound(_) => "worksheet_not_found",
            Self::HeaderMismatch(_) => "header_mismatch",
            Self::Config(_) => "config_error",
        }
    }
}

impl From<SheetsError> for StoreError {
    fn from(err: SheetsError) -> Self {
        match err {
            SheetsError::Status { status, message } => match status {
                401 | 403 | 404 => StoreError::Misconfigured(format!("HTTP {status}: {message}")),
                _ => StoreError::backend_status(BACKEND, status, message),
            },
            SheetsError::Timeout(after) => StoreError::Timeout(after),
            SheetsError::Http(e) if e.is_connect() => StoreError::Unreachable(e.to_string()),
            SheetsError::Http(e) => StoreError::backend(BACKEND, e.to_string()),
            SheetsError::Decode(message) => StoreError::backend(BACKEND, message),
            SheetsError::WorksheetNotFound(worksheet) => StoreError::WorksheetNotFound(worksheet),
            SheetsError::HeaderMismatch(message) => {
                StoreError::Misconfigured(format!("unexpected header row: {message}"))
            }
            SheetsError::Config(message) => StoreError::Misconfigured(message),
        }
    }
}
