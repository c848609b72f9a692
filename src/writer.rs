use crate::diary_entry::EntryFields;
use crate::error::{DiaryError, Result};
use crate::locator::RowLocator;
use crate::sheet_range::CellRange;
use crate::sheets::SheetBackend;
use log::debug;
use std::str::FromStr;

/// Column B, the first column the edit path writes. Column A (id) is never touched.
pub const FIRST_EDIT_COLUMN: u32 = 2;
pub const LAST_EDIT_COLUMN: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteStrategy {
    /// Five single-cell writes, B through F. A failure part way leaves the
    /// row holding a mix of old and new values.
    CellByCell,
    /// One write of `B{row}:F{row}`.
    #[default]
    Range,
}

impl FromStr for WriteStrategy {
    type Err = DiaryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cell" | "cells" | "cell-by-cell" => Ok(WriteStrategy::CellByCell),
            "range" | "batch" => Ok(WriteStrategy::Range),
            other => Err(DiaryError::Config(format!(
                "unknown write strategy '{}' (expected 'cell' or 'range')",
                other
            ))),
        }
    }
}

/// Writes the five editable columns of `locator`'s row.
pub async fn write_fields(
    backend: &dyn SheetBackend,
    tab: &str,
    locator: RowLocator,
    fields: EntryFields,
    strategy: WriteStrategy,
) -> Result<()> {
    let row = locator.row();
    match strategy {
        WriteStrategy::Range => {
            let range = CellRange::row_span(row, FIRST_EDIT_COLUMN, LAST_EDIT_COLUMN);
            debug!("writing {} as one range", range);
            backend
                .write_range(tab, range, vec![fields.into_cells()])
                .await
        }
        WriteStrategy::CellByCell => {
            for (col, value) in (FIRST_EDIT_COLUMN..).zip(fields.into_cells()) {
                let range = CellRange::cell(row, col);
                debug!("writing cell {}", range);
                backend.write_range(tab, range, vec![vec![value]]).await?;
            }
            Ok(())
        }
    }
}
