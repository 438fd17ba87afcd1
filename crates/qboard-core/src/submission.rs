//! Question submission
//!
//! Validates the two form fields, stamps the local time and appends exactly
//! one row. Validation failures never reach the store; append failures are
//! surfaced unchanged and never retried.

use crate::clock::Clock;
use crate::error::{SubmitError, ValidationError};
use crate::store::SheetStore;
use crate::types::{Ack, QuestionRecord, SubmittedAt, WorksheetId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Whitespace handling for submitted fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimPolicy {
    /// Store input verbatim; only the empty string is rejected
    Preserve,
    /// Trim surrounding whitespace before the emptiness check and storage
    #[default]
    Trim,
}

impl TrimPolicy {
    /// Apply policy to a field value
    #[inline]
    #[must_use]
    pub fn apply(self, value: &str) -> &str {
        match self {
            Self::Preserve => value,
            Self::Trim => value.trim(),
        }
    }
}

/// Validates and appends question rows
#[derive(Debug, Clone)]
pub struct SubmissionHandler {
    store: Arc<dyn SheetStore>,
    clock: Arc<dyn Clock>,
    worksheet: WorksheetId,
    trim: TrimPolicy,
}

impl SubmissionHandler {
    /// Create handler writing to `worksheet`
    #[must_use]
    pub fn new(
        store: Arc<dyn SheetStore>,
        clock: Arc<dyn Clock>,
        worksheet: WorksheetId,
        trim: TrimPolicy,
    ) -> Self {
        Self {
            store,
            clock,
            worksheet,
            trim,
        }
    }

    /// Check both fields and return the values that would be stored
    pub fn validate<'a>(
        &self,
        group: &'a str,
        text: &'a str,
    ) -> Result<(&'a str, &'a str), ValidationError> {
        let group = self.trim.apply(group);
        let text = self.trim.apply(text);

        match ValidationError::check(group.is_empty(), text.is_empty()) {
            Some(err) => Err(err),
            None => Ok((group, text)),
        }
    }

    /// Validate, stamp and append one question
    pub async fn submit(&self, group: &str, text: &str) -> Result<Ack, SubmitError> {
        let (group, text) = self.validate(group, text).map_err(|err| {
            tracing::warn!(reason = ?err, "Submission rejected");
            err
        })?;

        let record = QuestionRecord::new(group, text, SubmittedAt::new(self.clock.now()));

        self.store
            .append(&self.worksheet, &record)
            .await
            .map_err(|err| {
                tracing::error!(
                    backend = self.store.backend_tag(),
                    worksheet = %self.worksheet,
                    code = err.code(),
                    "Append failed: {}",
                    err
                );
                SubmitError::WriteFault(err)
            })?;

        tracing::info!(
            group = %record.group,
            submitted_at = %record.submitted_at,
            "Question submitted"
        );

        Ok(Ack {
            group: record.group,
            submitted_at: record.submitted_at,
        })
    }

    /// Worksheet receiving appends
    #[inline]
    #[must_use]
    pub fn worksheet(&self) -> &WorksheetId {
        &self.worksheet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemorySheet;
    use crate::types::COLUMNS;
    use chrono::NaiveDateTime;

    fn handler(store: Arc<MemorySheet>, trim: TrimPolicy) -> SubmissionHandler {
        let start = NaiveDateTime::parse_from_str("2024-05-06 07:08:09", SubmittedAt::FORMAT).unwrap();
        SubmissionHandler::new(
            store,
            Arc::new(FixedClock::new(start)),
            WorksheetId::default(),
            trim,
        )
    }

    #[tokio::test]
    async fn valid_submission_appends_one_row() {
        let store = Arc::new(MemorySheet::with_worksheet("Sheet1"));
        let handler = handler(store.clone(), TrimPolicy::Trim);

        let ack = handler.submit("Team Diamond", "Why?").await.unwrap();
        assert_eq!(ack.group, "Team Diamond");
        assert_eq!(ack.submitted_at.to_string(), "2024-05-06 07:08:09");

        let rows = store.read_all(&WorksheetId::default(), &COLUMNS).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].submitted_at.as_deref(), Some("2024-05-06 07:08:09"));
    }

    #[tokio::test]
    async fn empty_fields_write_nothing() {
        let store = Arc::new(MemorySheet::with_worksheet("Sheet1"));
        let handler = handler(store.clone(), TrimPolicy::Trim);

        for (group, text) in [("", "q"), ("A", ""), ("", "")] {
            let err = handler.submit(group, text).await.unwrap_err();
            assert!(err.is_validation());
        }
        assert_eq!(store.row_count(&WorksheetId::default()), 0);
    }

    #[tokio::test]
    async fn trim_policy_rejects_whitespace_only() {
        let store = Arc::new(MemorySheet::with_worksheet("Sheet1"));
        let handler = handler(store.clone(), TrimPolicy::Trim);

        let err = handler.submit("   ", "q").await.unwrap_err();
        assert!(matches!(err, SubmitError::Validation(ValidationError::MissingGroup)));

        let ack = handler.submit("  A  ", "  q ").await.unwrap();
        assert_eq!(ack.group, "A");
    }

    #[tokio::test]
    async fn preserve_policy_keeps_whitespace() {
        let store = Arc::new(MemorySheet::with_worksheet("Sheet1"));
        let handler = handler(store.clone(), TrimPolicy::Preserve);

        let ack = handler.submit(" A ", "q").await.unwrap();
        assert_eq!(ack.group, " A ");
        assert!(handler.submit("", "q").await.is_err());
    }

    #[tokio::test]
    async fn append_failure_is_write_fault() {
        let store = Arc::new(MemorySheet::new());
        let handler = handler(store, TrimPolicy::Trim);

        let err = handler.submit("A", "q").await.unwrap_err();
        assert!(matches!(err, SubmitError::WriteFault(_)));
    }
}
