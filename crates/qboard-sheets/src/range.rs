//! A1-notation ranges for the fixed column layout.

use qboard_core::{Column, SheetRow, WorksheetId};

/// Quote a worksheet title for A1 notation.
///
/// Titles are always quoted; embedded single quotes are doubled.
pub fn quote_title(worksheet: &WorksheetId) -> String {
    format!("'{}'", worksheet.as_str().replace('\'', "''"))
}

/// Contiguous column span covering `columns`, as (first, last).
pub fn span(columns: &[Column]) -> Option<(Column, Column)> {
    let first = columns.iter().copied().min_by_key(|c| c.index())?;
    let last = columns.iter().copied().max_by_key(|c| c.index())?;
    Some((first, last))
}

/// Data range starting at `first_row`, open-ended downwards: `'Sheet1'!A2:C`.
pub fn data_range(worksheet: &WorksheetId, columns: &[Column], first_row: u32) -> Option<String> {
    let (first, last) = span(columns)?;
    Some(format!(
        "{}!{}{}:{}",
        quote_title(worksheet),
        first.letter(),
        first_row,
        last.letter()
    ))
}

/// Single-row range: `'Sheet1'!A1:C1`.
pub fn row_range(worksheet: &WorksheetId, columns: &[Column], row: u32) -> Option<String> {
    let (first, last) = span(columns)?;
    Some(format!(
        "{}!{}{row}:{}{row}",
        quote_title(worksheet),
        first.letter(),
        last.letter()
    ))
}

/// Whole-column range used as the append anchor: `'Sheet1'!A:C`.
pub fn append_range(worksheet: &WorksheetId, columns: &[Column]) -> Option<String> {
    let (first, last) = span(columns)?;
    Some(format!(
        "{}!{}:{}",
        quote_title(worksheet),
        first.letter(),
        last.letter()
    ))
}

/// Map positional cells of a span read back onto a row.
///
/// Cells outside `columns` are dropped; empty strings become absent.
pub fn row_from_span(cells: &[String], columns: &[Column]) -> SheetRow {
    let Some((first, _)) = span(columns) else {
        return SheetRow::default();
    };

    let cell = |column: Column| -> Option<String> {
        if !columns.contains(&column) {
            return None;
        }
        let offset = column.index().checked_sub(first.index())?;
        cells.get(offset).filter(|v| !v.is_empty()).cloned()
    };

    SheetRow {
        group: cell(Column::Group),
        text: cell(Column::Text),
        submitted_at: cell(Column::SubmittedAt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qboard_core::COLUMNS;

    #[test]
    fn ranges_for_full_layout() {
        let sheet = WorksheetId::from("Sheet1");
        assert_eq!(data_range(&sheet, &COLUMNS, 2).as_deref(), Some("'Sheet1'!A2:C"));
        assert_eq!(append_range(&sheet, &COLUMNS).as_deref(), Some("'Sheet1'!A:C"));
        assert_eq!(row_range(&sheet, &COLUMNS, 1).as_deref(), Some("'Sheet1'!A1:C1"));
    }

    #[test]
    fn titles_with_quotes_are_escaped() {
        let sheet = WorksheetId::from("Team's Q&A");
        assert_eq!(quote_title(&sheet), "'Team''s Q&A'");
    }

    #[test]
    fn empty_columns_have_no_range() {
        assert!(data_range(&WorksheetId::default(), &[], 2).is_none());
    }

    #[test]
    fn short_rows_map_to_absent_cells() {
        let row = row_from_span(&["A".to_string()], &COLUMNS);
        assert_eq!(row.group.as_deref(), Some("A"));
        assert!(row.text.is_none());

        let blank = row_from_span(&[], &COLUMNS);
        assert!(blank.is_blank());
    }

    #[test]
    fn partial_span_is_offset() {
        let row = row_from_span(
            &["q".to_string(), "2024-01-01 10:00:00".to_string()],
            &[Column::Text, Column::SubmittedAt],
        );
        assert!(row.group.is_none());
        assert_eq!(row.text.as_deref(), Some("q"));
        assert_eq!(row.submitted_at.as_deref(), Some("2024-01-01 10:00:00"));
    }
}
