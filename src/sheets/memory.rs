//! In-process spreadsheet

use super::SheetBackend;
use crate::diary_entry::COLUMNS;
use crate::error::{DiaryError, Result};
use crate::sheet_range::CellRange;
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Book {
    tabs: Vec<(String, Vec<Vec<String>>)>,
    /// Writes allowed before every further write fails. `None` = unlimited.
    writes_left: Option<usize>,
}

impl Book {
    fn tab_mut(&mut self, tab: &str) -> Result<&mut Vec<Vec<String>>> {
        self.tabs
            .iter_mut()
            .find(|(title, _)| title == tab)
            .map(|(_, rows)| rows)
            .ok_or_else(|| DiaryError::Backend(format!("no tab named '{}'", tab)))
    }

    fn take_write(&mut self) -> Result<()> {
        match self.writes_left {
            Some(0) => Err(DiaryError::Backend("injected write failure".to_string())),
            Some(n) => {
                self.writes_left = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Spreadsheet held in memory. Used for the offline backend and tests.
#[derive(Default)]
pub struct MemorySheet {
    book: Mutex<Book>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sheet with one tab carrying the diary header row.
    pub fn diary(tab: &str) -> Self {
        let header = COLUMNS.iter().map(|c| c.to_string()).collect();
        Self::new().with_tab(tab, vec![header])
    }

    pub fn with_tab(self, title: &str, rows: Vec<Vec<String>>) -> Self {
        if let Ok(mut book) = self.book.lock() {
            book.tabs.push((title.to_string(), rows));
        }
        self
    }

    /// Every write after the next `n` fails with `DiaryError::Backend`.
    pub fn fail_writes_after(&self, n: usize) -> Result<()> {
        self.lock()?.writes_left = Some(n);
        Ok(())
    }

    /// Snapshot of a tab's rows.
    pub fn rows(&self, tab: &str) -> Result<Vec<Vec<String>>> {
        Ok(self.lock()?.tab_mut(tab)?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Book>> {
        self.book
            .lock()
            .map_err(|_| DiaryError::Backend("sheet lock poisoned".to_string()))
    }
}

fn trim_trailing_empty<T>(items: &mut Vec<T>, is_empty: impl Fn(&T) -> bool) {
    while items.last().is_some_and(&is_empty) {
        items.pop();
    }
}

#[async_trait]
impl SheetBackend for MemorySheet {
    async fn tab_titles(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.tabs.iter().map(|(title, _)| title.clone()).collect())
    }

    async fn read_range(&self, tab: &str, range: CellRange) -> Result<Vec<Vec<String>>> {
        let mut book = self.lock()?;
        let rows = book.tab_mut(tab)?;

        let (top, bottom) = range.rows.unwrap_or((1, rows.len() as u32));
        let first = range.first_col as usize - 1;
        let last = range.last_col as usize;

        let mut out: Vec<Vec<String>> = (top..=bottom)
            .map(|r| {
                let mut cells: Vec<String> = rows
                    .get(r as usize - 1)
                    .map(|row| {
                        row.iter()
                            .skip(first)
                            .take(last - first)
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                trim_trailing_empty(&mut cells, |c| c.is_empty());
                cells
            })
            .collect();
        trim_trailing_empty(&mut out, |r| r.is_empty());
        Ok(out)
    }

    async fn write_range(
        &self,
        tab: &str,
        range: CellRange,
        values: Vec<Vec<String>>,
    ) -> Result<()> {
        let mut book = self.lock()?;
        book.take_write()?;
        let rows = book.tab_mut(tab)?;

        let top = range.rows.map_or(1, |(top, _)| top) as usize;
        let first = range.first_col as usize - 1;

        for (offset, values) in values.into_iter().enumerate() {
            let index = top - 1 + offset;
            if rows.len() <= index {
                rows.resize(index + 1, Vec::new());
            }
            let row = &mut rows[index];
            if row.len() < first + values.len() {
                row.resize(first + values.len(), String::new());
            }
            for (col, value) in values.into_iter().enumerate() {
                row[first + col] = value;
            }
        }
        Ok(())
    }

    async fn append_row(&self, tab: &str, row: Vec<String>) -> Result<()> {
        let mut book = self.lock()?;
        book.take_write()?;
        let rows = book.tab_mut(tab)?;
        trim_trailing_empty(rows, |r| r.iter().all(|c| c.is_empty()));
        rows.push(row);
        Ok(())
    }
}
