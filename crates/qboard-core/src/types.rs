//! Core types for the board
//!
//! - Worksheet and viewer identifiers
//! - The fixed three-column row layout
//! - `QuestionRecord` (validated) and `SheetRow` (raw store cells)
//! - `SubmittedAt`, an ordered timestamp with a fixed wire format

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Worksheet identifier within the spreadsheet store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorksheetId(String);

impl WorksheetId {
    /// Create worksheet id
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Worksheet name as it appears in the store
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WorksheetId {
    fn default() -> Self {
        Self::new("Sheet1")
    }
}

impl From<&str> for WorksheetId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for WorksheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Browser-scoped viewer identity; owns its own read snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewerId(pub Uuid);

impl ViewerId {
    /// Generate new viewer id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewerId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ViewerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store column, in layout order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// Group (team) name
    Group,
    /// Question text
    Text,
    /// Submission timestamp
    SubmittedAt,
}

/// Fixed worksheet layout: `group, text, submitted_at`
pub const COLUMNS: [Column; 3] = [Column::Group, Column::Text, Column::SubmittedAt];

impl Column {
    /// Zero-based position in the worksheet
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Group => 0,
            Self::Text => 1,
            Self::SubmittedAt => 2,
        }
    }

    /// Spreadsheet column letter (`A`, `B`, `C`)
    #[inline]
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::Group => 'A',
            Self::Text => 'B',
            Self::SubmittedAt => 'C',
        }
    }

    /// Header cell written in the first worksheet row
    #[inline]
    #[must_use]
    pub fn header(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Text => "text",
            Self::SubmittedAt => "submitted_at",
        }
    }
}

/// Submission instant, second precision
///
/// Ordered chronologically; rendered as `YYYY-MM-DD HH:MM:SS` at the store
/// and page boundaries only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmittedAt(NaiveDateTime);

impl SubmittedAt {
    /// Wire format used by the store
    pub const FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    /// Wrap a local date-time, truncating sub-second precision
    #[must_use]
    pub fn new(at: NaiveDateTime) -> Self {
        use chrono::Timelike;
        Self(at.with_nanosecond(0).unwrap_or(at))
    }

    /// Parse the wire format
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(s.trim(), Self::FORMAT).map(Self)
    }

    /// Underlying date-time
    #[inline]
    #[must_use]
    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for SubmittedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for SubmittedAt {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SubmittedAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SubmittedAt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// One validated question row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Display-grouping key
    pub group: String,
    /// Question content
    pub text: String,
    /// Stamped at append time
    pub submitted_at: SubmittedAt,
}

impl QuestionRecord {
    /// Create new record
    #[inline]
    #[must_use]
    pub fn new(group: impl Into<String>, text: impl Into<String>, submitted_at: SubmittedAt) -> Self {
        Self {
            group: group.into(),
            text: text.into(),
            submitted_at,
        }
    }

    /// Raw store row for this record
    #[must_use]
    pub fn to_row(&self) -> SheetRow {
        SheetRow {
            group: Some(self.group.clone()),
            text: Some(self.text.clone()),
            submitted_at: Some(self.submitted_at.to_string()),
        }
    }
}

/// Raw worksheet row as read from the store
///
/// Cells may be absent (short rows, blank rows).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRow {
    /// Group cell
    pub group: Option<String>,
    /// Question cell
    pub text: Option<String>,
    /// Timestamp cell
    pub submitted_at: Option<String>,
}

impl SheetRow {
    /// Build row from positional cells; missing trailing cells are absent
    #[must_use]
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells = cells.into_iter().map(Into::into);
        Self {
            group: cells.next(),
            text: cells.next(),
            submitted_at: cells.next(),
        }
    }

    /// Positional cells in column order
    #[must_use]
    pub fn into_cells(self) -> Vec<String> {
        vec![
            self.group.unwrap_or_default(),
            self.text.unwrap_or_default(),
            self.submitted_at.unwrap_or_default(),
        ]
    }

    /// Cell value for column
    #[must_use]
    pub fn cell(&self, column: Column) -> Option<&str> {
        match column {
            Column::Group => self.group.as_deref(),
            Column::Text => self.text.as_deref(),
            Column::SubmittedAt => self.submitted_at.as_deref(),
        }
    }

    /// Every cell empty or absent (a blank spreadsheet row)
    #[must_use]
    pub fn is_blank(&self) -> bool {
        COLUMNS
            .iter()
            .all(|c| self.cell(*c).map_or(true, |v| v.trim().is_empty()))
    }
}

/// Successful submission acknowledgment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    /// Submitting group
    pub group: String,
    /// Timestamp written to the store
    pub submitted_at: SubmittedAt,
}

impl Ack {
    /// Confirmation shown to the submitter
    #[must_use]
    pub fn message(&self) -> String {
        format!("The question from '{}' was submitted successfully!", self.group)
    }
}
