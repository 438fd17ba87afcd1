//! Grouped question board
//!
//! Rebuilt from the full row set on every render:
//! 1. Drop blank rows
//! 2. Skip rows without a group (there is nothing to file them under)
//! 3. Group by exact group name (no case or whitespace folding)
//! 4. Groups ascending by name, questions newest first; questions whose
//!    timestamp cell cannot be read sort after the rest and keep the raw cell

use crate::cache::{CacheOutcome, SnapshotCache, SnapshotKey};
use crate::error::BoardError;
use crate::store::SheetStore;
use crate::types::{SheetRow, SubmittedAt, ViewerId, WorksheetId, COLUMNS};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shown instead of the board when there are no questions
pub const EMPTY_BOARD_MESSAGE: &str =
    "No questions have been submitted yet. Leave the first one from the sidebar!";

/// One question as displayed
///
/// Rows written by the board always carry a parsed timestamp. Rows typed
/// into the worksheet by hand may not; those keep the raw cell text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardQuestion {
    /// Group name, verbatim
    pub group: String,
    /// Question text; empty when the cell is empty
    pub text: String,
    /// Parsed submission time
    pub submitted_at: Option<SubmittedAt>,
    /// Timestamp cell as stored; empty when absent
    pub submitted_raw: String,
}

impl BoardQuestion {
    fn from_row(group: &str, row: &SheetRow) -> Self {
        let submitted_raw = row.submitted_at.clone().unwrap_or_default();
        Self {
            group: group.to_string(),
            text: row.text.clone().unwrap_or_default(),
            submitted_at: SubmittedAt::parse(&submitted_raw).ok(),
            submitted_raw,
        }
    }

    /// Timestamp text to show: the wire format when parsed, else the raw cell
    #[must_use]
    pub fn timestamp_text(&self) -> Cow<'_, str> {
        match self.submitted_at {
            Some(at) => Cow::Owned(at.to_string()),
            None => Cow::Borrowed(self.submitted_raw.as_str()),
        }
    }
}

/// One group's questions, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupView {
    /// Group name, verbatim
    pub name: String,
    /// Questions ordered by submission time, descending; unreadable times last
    pub questions: Vec<BoardQuestion>,
}

impl GroupView {
    /// Number of questions in the group
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.questions.len()
    }
}

/// Derived board view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Board {
    /// Groups in ascending name order
    pub groups: Vec<GroupView>,
    /// Non-blank rows left out because their group cell is empty
    pub skipped: usize,
}

impl Board {
    /// Build the board from raw store rows
    #[must_use]
    pub fn from_rows(rows: &[SheetRow]) -> Self {
        let mut grouped: BTreeMap<&str, Vec<BoardQuestion>> = BTreeMap::new();
        let mut skipped = 0;

        for (index, row) in rows.iter().enumerate() {
            if row.is_blank() {
                continue;
            }
            match row.group.as_deref().filter(|g| !g.is_empty()) {
                Some(group) => grouped
                    .entry(group)
                    .or_default()
                    .push(BoardQuestion::from_row(group, row)),
                None => {
                    tracing::warn!(index, ?row, "Skipping row without a group");
                    skipped += 1;
                }
            }
        }

        let groups = grouped
            .into_iter()
            .map(|(name, mut questions)| {
                // None < Some, so descending order puts unreadable times last
                questions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
                GroupView {
                    name: name.to_string(),
                    questions,
                }
            })
            .collect();

        Self { groups, skipped }
    }

    /// No questions to show
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total question count across groups
    #[must_use]
    pub fn total(&self) -> usize {
        self.groups.iter().map(GroupView::count).sum()
    }

    /// Empty-state message, when there is nothing to show
    #[inline]
    #[must_use]
    pub fn empty_message(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_BOARD_MESSAGE)
    }

    /// Look up a group by exact name
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&GroupView> {
        self.groups.iter().find(|g| g.name == name)
    }
}

/// Reads the worksheet through the snapshot cache and builds the board
#[derive(Debug, Clone)]
pub struct BoardRenderer {
    store: Arc<dyn SheetStore>,
    cache: SnapshotCache,
    worksheet: WorksheetId,
}

impl BoardRenderer {
    /// Create renderer for `worksheet`
    #[must_use]
    pub fn new(store: Arc<dyn SheetStore>, cache: SnapshotCache, worksheet: WorksheetId) -> Self {
        Self {
            store,
            cache,
            worksheet,
        }
    }

    /// Build the board as seen by `viewer`
    ///
    /// Inside the freshness window the viewer's previous snapshot is reused.
    /// A read failure is returned for this render only; nothing stale is
    /// substituted.
    pub async fn render(&self, viewer: &ViewerId) -> Result<Board, BoardError> {
        let key = SnapshotKey::new(*viewer, self.worksheet.clone());

        let (snapshot, outcome) = self
            .cache
            .try_get_or_fetch(key, || self.store.read_all(&self.worksheet, &COLUMNS))
            .await
            .map_err(|err| {
                tracing::error!(
                    backend = self.store.backend_tag(),
                    worksheet = %self.worksheet,
                    code = err.code(),
                    "Read failed: {}",
                    err
                );
                BoardError::read_fault(self.worksheet.clone(), err)
            })?;

        match outcome {
            CacheOutcome::Hit => tracing::debug!(%viewer, "Snapshot reused"),
            CacheOutcome::Miss => tracing::debug!(%viewer, rows = snapshot.len(), "Snapshot fetched"),
        }

        Ok(Board::from_rows(&snapshot))
    }

    /// Snapshot cache backing this renderer
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }
}
