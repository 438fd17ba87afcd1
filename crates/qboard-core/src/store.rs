//! Row store abstraction
//!
//! The board only needs two operations against a spreadsheet-like store:
//! append one row and read every row of a worksheet. Backends implement
//! [`SheetStore`]; [`MemorySheet`] keeps worksheets in process memory.

use crate::error::StoreError;
use crate::types::{Column, QuestionRecord, SheetRow, WorksheetId};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Spreadsheet-like row store
#[async_trait]
pub trait SheetStore: Send + Sync + std::fmt::Debug {
    /// Short backend tag for logs
    fn backend_tag(&self) -> &'static str;

    /// Check the store is reachable and the worksheet addressable
    async fn probe(&self, worksheet: &WorksheetId) -> Result<(), StoreError>;

    /// Append exactly one row
    async fn append(&self, worksheet: &WorksheetId, record: &QuestionRecord) -> Result<(), StoreError>;

    /// Read every data row, restricted to `columns`, in store order
    async fn read_all(
        &self,
        worksheet: &WorksheetId,
        columns: &[Column],
    ) -> Result<Vec<SheetRow>, StoreError>;
}

/// In-process worksheets
#[derive(Debug, Default)]
pub struct MemorySheet {
    sheets: RwLock<HashMap<WorksheetId, Vec<SheetRow>>>,
}

impl MemorySheet {
    /// Create store with no worksheets
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store holding one empty worksheet
    #[must_use]
    pub fn with_worksheet(worksheet: impl Into<WorksheetId>) -> Self {
        let store = Self::new();
        store.add_worksheet(worksheet);
        store
    }

    /// Add an empty worksheet; existing rows are kept
    pub fn add_worksheet(&self, worksheet: impl Into<WorksheetId>) {
        self.sheets.write().entry(worksheet.into()).or_default();
    }

    /// Append a raw row, bypassing validation
    pub fn push_row(&self, worksheet: impl Into<WorksheetId>, row: SheetRow) {
        self.sheets.write().entry(worksheet.into()).or_default().push(row);
    }

    /// Number of rows in worksheet, blank rows included
    #[must_use]
    pub fn row_count(&self, worksheet: &WorksheetId) -> usize {
        self.sheets.read().get(worksheet).map_or(0, Vec::len)
    }
}

#[async_trait]
impl SheetStore for MemorySheet {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn probe(&self, worksheet: &WorksheetId) -> Result<(), StoreError> {
        if self.sheets.read().contains_key(worksheet) {
            Ok(())
        } else {
            Err(StoreError::WorksheetNotFound(worksheet.clone()))
        }
    }

    async fn append(&self, worksheet: &WorksheetId, record: &QuestionRecord) -> Result<(), StoreError> {
        let mut sheets = self.sheets.write();
        let rows = sheets
            .get_mut(worksheet)
            .ok_or_else(|| StoreError::WorksheetNotFound(worksheet.clone()))?;
        rows.push(record.to_row());
        Ok(())
    }

    async fn read_all(
        &self,
        worksheet: &WorksheetId,
        columns: &[Column],
    ) -> Result<Vec<SheetRow>, StoreError> {
        let sheets = self.sheets.read();
        let rows = sheets
            .get(worksheet)
            .ok_or_else(|| StoreError::WorksheetNotFound(worksheet.clone()))?;

        Ok(rows.iter().map(|row| project(row, columns)).collect())
    }
}

/// Keep only the requested columns of a row
fn project(row: &SheetRow, columns: &[Column]) -> SheetRow {
    let keep = |column: Column, value: &Option<String>| {
        if columns.contains(&column) {
            value.clone()
        } else {
            None
        }
    };

    SheetRow {
        group: keep(Column::Group, &row.group),
        text: keep(Column::Text, &row.text),
        submitted_at: keep(Column::SubmittedAt, &row.submitted_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SubmittedAt, COLUMNS};

    fn record(group: &str, text: &str) -> QuestionRecord {
        QuestionRecord::new(group, text, SubmittedAt::parse("2024-01-01 10:00:00").unwrap())
    }

    #[tokio::test]
    async fn append_then_read_keeps_insertion_order() {
        let store = MemorySheet::with_worksheet("Sheet1");
        let sheet = WorksheetId::from("Sheet1");

        store.append(&sheet, &record("B", "first")).await.unwrap();
        store.append(&sheet, &record("A", "second")).await.unwrap();

        let rows = store.read_all(&sheet, &COLUMNS).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text.as_deref(), Some("first"));
        assert_eq!(rows[1].text.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn missing_worksheet_faults() {
        let store = MemorySheet::new();
        let sheet = WorksheetId::from("Nope");

        assert!(matches!(
            store.probe(&sheet).await,
            Err(StoreError::WorksheetNotFound(_))
        ));
        assert!(store.append(&sheet, &record("A", "q")).await.is_err());
        assert!(store.read_all(&sheet, &COLUMNS).await.is_err());
    }

    #[tokio::test]
    async fn read_projects_columns() {
        let store = MemorySheet::with_worksheet("Sheet1");
        let sheet = WorksheetId::from("Sheet1");
        store.append(&sheet, &record("A", "q")).await.unwrap();

        let rows = store.read_all(&sheet, &[Column::Group]).await.unwrap();
        assert_eq!(rows[0].group.as_deref(), Some("A"));
        assert!(rows[0].text.is_none());
    }
}
