//! Error types for the question board
//!
//! Provides error handling for:
//! - Store faults (connection, read, write)
//! - Submission validation (recovered locally, never a system fault)
//! - Board rendering failures scoped to one render cycle

use crate::types::WorksheetId;
use std::time::Duration;

/// Errors raised by a store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend could not be reached
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// Credentials or addressing rejected by the backend
    #[error("store misconfigured: {0}")]
    Misconfigured(String),

    /// Worksheet does not exist
    #[error("worksheet not found: {0}")]
    WorksheetNotFound(WorksheetId),

    /// Backend-specific failure
    #[error("{backend} error: {message}")]
    Backend {
        /// Backend tag (e.g. "sheets")
        backend: &'static str,
        /// Backend message
        message: String,
        /// HTTP status, when the backend speaks HTTP
        status: Option<u16>,
    },

    /// Backend did not answer in time
    #[error("store timed out after {0:?}")]
    Timeout(Duration),
}

impl StoreError {
    /// Create backend error
    pub fn backend(backend: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            backend,
            message: message.into(),
            status: None,
        }
    }

    /// Create backend error carrying an HTTP status
    pub fn backend_status(backend: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            backend,
            message: message.into(),
            status: Some(status),
        }
    }

    /// Whether a manual retry could plausibly succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unreachable(_) | Self::Timeout(_) => true,
            Self::Backend { status, .. } => status.map_or(true, |s| s == 429 || s >= 500),
            Self::Misconfigured(_) | Self::WorksheetNotFound(_) => false,
        }
    }

    /// Short error code for logging
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "unreachable",
            Self::Misconfigured(_) => "misconfigured",
            Self::WorksheetNotFound(_) => "worksheet_not_found",
            Self::Backend { .. } => "backend_error",
            Self::Timeout(_) => "timeout",
        }
    }
}

/// Submission rejected before any write
///
/// The display text is the user-facing warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Neither field filled in
    #[error("Please enter both a group name and a question.")]
    MissingBoth,

    /// Group name empty
    #[error("Please enter a group name.")]
    MissingGroup,

    /// Question text empty
    #[error("Please enter a question.")]
    MissingText,
}

impl ValidationError {
    /// Classify which of the two fields are empty
    #[must_use]
    pub fn check(group_empty: bool, text_empty: bool) -> Option<Self> {
        match (group_empty, text_empty) {
            (true, true) => Some(Self::MissingBoth),
            (true, false) => Some(Self::MissingGroup),
            (false, true) => Some(Self::MissingText),
            (false, false) => None,
        }
    }
}

/// Submission failure
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Input rejected; nothing written
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Append failed after validation passed
    #[error("could not save the question: {0}")]
    WriteFault(#[source] StoreError),
}

impl SubmitError {
    /// Validation failures are user mistakes, not faults
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Board-level failure
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// Store unusable at startup; fatal to the session
    #[error("cannot connect to the question store: {0}")]
    ConnectionFault(#[source] StoreError),

    /// Read failed during one render
    #[error("could not load questions from worksheet '{worksheet}': {source}")]
    ReadFault {
        /// Worksheet being read
        worksheet: WorksheetId,
        /// Underlying store fault
        #[source]
        source: StoreError,
    },
}

impl BoardError {
    /// Create read fault for worksheet
    pub fn read_fault(worksheet: WorksheetId, source: StoreError) -> Self {
        Self::ReadFault { worksheet, source }
    }

    /// Whether the session must stop
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConnectionFault(_))
    }
}
