//! Spreadsheet storage backends.
//!
//! `SheetBackend` is the only way the diary talks to storage. The REST
//! client speaks to Google Sheets; the memory backend keeps tabs in
//! process for offline use and tests.

mod client;
mod memory;
mod types;

pub use client::{SheetsClient, SHEETS_API_BASE};
pub use memory::MemorySheet;
pub use types::*;

use crate::error::Result;
use crate::sheet_range::CellRange;
use async_trait::async_trait;

#[async_trait]
pub trait SheetBackend: Send + Sync {
    /// Worksheet titles in sheet order.
    async fn tab_titles(&self) -> Result<Vec<String>>;

    /// Cell text of `range`. Trailing empty cells and rows may be omitted.
    async fn read_range(&self, tab: &str, range: CellRange) -> Result<Vec<Vec<String>>>;

    async fn write_range(&self, tab: &str, range: CellRange, rows: Vec<Vec<String>>)
        -> Result<()>;

    /// Appends `row` after the last non-empty row of the tab.
    async fn append_row(&self, tab: &str, row: Vec<String>) -> Result<()>;
}
