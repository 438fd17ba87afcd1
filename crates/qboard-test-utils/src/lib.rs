//! Testing utilities for qboard workspace
//!
//! Shared fakes, fixtures, and assertions.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::NaiveDateTime;
use parking_lot::Mutex;
use qboard_core::{
    Column, FixedClock, MemorySheet, QuestionRecord, SheetRow, SheetStore, StoreError, SubmittedAt,
    WorksheetId,
};
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

pub const SHEET: &str = "Sheet1";

/// Which store operation to break
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Probe,
    /// Append fails as if the store were unreachable
    Append,
    /// Append refused for good (bad credentials, protected range)
    AppendRejected,
    Read,
}

impl Fault {
    fn error(self) -> StoreError {
        match self {
            Self::AppendRejected => StoreError::Misconfigured(format!("injected {self:?} fault")),
            _ => StoreError::Unreachable(format!("injected {self:?} fault")),
        }
    }
}

/// Memory-backed store that counts calls and can be told to fail
#[derive(Debug, Default)]
pub struct RecordingStore {
    sheet: MemorySheet,
    appends: AtomicUsize,
    reads: AtomicUsize,
    faults: Mutex<Vec<Fault>>,
    appended: Mutex<Vec<QuestionRecord>>,
}

impl RecordingStore {
    /// Store with the default worksheet
    pub fn new() -> Self {
        let store = Self::default();
        store.sheet.add_worksheet(SHEET);
        store
    }

    /// Store pre-filled with raw rows
    pub fn with_rows(rows: impl IntoIterator<Item = SheetRow>) -> Self {
        let store = Self::new();
        for row in rows {
            store.sheet.push_row(SHEET, row);
        }
        store
    }

    pub fn fail(&self, fault: Fault) {
        self.faults.lock().push(fault);
    }

    pub fn heal(&self) {
        self.faults.lock().clear();
    }

    pub fn push_row(&self, row: SheetRow) {
        self.sheet.push_row(SHEET, row);
    }

    pub fn append_calls(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn appended(&self) -> Vec<QuestionRecord> {
        self.appended.lock().clone()
    }

    fn check(&self, fault: Fault) -> Result<(), StoreError> {
        if self.faults.lock().contains(&fault) {
            return Err(fault.error());
        }
        Ok(())
    }
}

#[async_trait]
impl SheetStore for RecordingStore {
    fn backend_tag(&self) -> &'static str {
        "recording"
    }

    async fn probe(&self, worksheet: &WorksheetId) -> Result<(), StoreError> {
        self.check(Fault::Probe)?;
        self.sheet.probe(worksheet).await
    }

    async fn append(&self, worksheet: &WorksheetId, record: &QuestionRecord) -> Result<(), StoreError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        self.check(Fault::Append)?;
        self.check(Fault::AppendRejected)?;
        self.sheet.append(worksheet, record).await?;
        self.appended.lock().push(record.clone());
        Ok(())
    }

    async fn read_all(
        &self,
        worksheet: &WorksheetId,
        columns: &[Column],
    ) -> Result<Vec<SheetRow>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check(Fault::Read)?;
        self.sheet.read_all(worksheet, columns).await
    }
}

pub fn row(group: &str, text: &str, submitted_at: &str) -> SheetRow {
    SheetRow::from_cells([group, text, submitted_at])
}

pub fn at(s: &str) -> SubmittedAt {
    SubmittedAt::parse(s).unwrap()
}

pub fn fixed_clock(start: &str) -> FixedClock {
    FixedClock::new(NaiveDateTime::parse_from_str(start, SubmittedAt::FORMAT).unwrap())
}

/// The three-row fixture: A/q1 10:00, B/q2 09:00, A/q3 11:00
pub fn sample_rows() -> Vec<SheetRow> {
    vec![
        row("A", "q1", "2024-01-01 10:00:00"),
        row("B", "q2", "2024-01-01 09:00:00"),
        row("A", "q3", "2024-01-01 11:00:00"),
    ]
}

/// True when `s` is exactly `YYYY-MM-DD HH:MM:SS`
pub fn is_wire_timestamp(s: &str) -> bool {
    static WIRE: OnceLock<Regex> = OnceLock::new();
    WIRE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").unwrap())
        .is_match(s)
}
