use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Header names of columns A through F, in storage order.
pub const COLUMNS: [&str; 6] = ["id", "entry_date", "title", "content", "tag", "weather"];

/// One data row of the diary sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    /// `None` when the id cell is blank or not an integer.
    pub id: Option<u64>,
    pub entry_date: String,
    pub title: String,
    pub content: String,
    pub tag: String,
    pub weather: String,
}

/// The five columns (B..F) the edit flow is allowed to write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFields {
    pub entry_date: String,
    pub title: String,
    pub content: String,
    pub tag: String,
    pub weather: String,
}

/// Input of the append form. The id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub entry_date: NaiveDate,
    pub title: String,
    pub content: String,
    pub tag: String,
    pub weather: String,
}

/// Position of each expected column in the sheet's header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    positions: [Option<usize>; 6],
}

impl ColumnMap {
    pub fn from_header(header: &[String]) -> Self {
        let mut positions = [None; 6];
        for (slot, name) in positions.iter_mut().zip(COLUMNS) {
            *slot = header.iter().position(|cell| cell.trim() == name);
        }
        ColumnMap { positions }
    }

    /// Names of expected columns the header does not carry.
    pub fn missing(&self) -> Vec<&'static str> {
        self.positions
            .iter()
            .zip(COLUMNS)
            .filter(|(pos, _)| pos.is_none())
            .map(|(_, name)| name)
            .collect()
    }

    fn cell(&self, row: &[String], column: usize) -> String {
        self.positions[column]
            .and_then(|i| row.get(i))
            .cloned()
            .unwrap_or_default()
    }
}

impl DiaryEntry {
    /// Builds an entry from a raw row. Missing columns and short rows are
    /// backfilled with empty strings.
    pub fn from_row(columns: &ColumnMap, row: &[String]) -> Self {
        DiaryEntry {
            id: columns.cell(row, 0).trim().parse().ok(),
            entry_date: columns.cell(row, 1),
            title: columns.cell(row, 2),
            content: columns.cell(row, 3),
            tag: columns.cell(row, 4),
            weather: columns.cell(row, 5),
        }
    }

    pub fn fields(&self) -> EntryFields {
        EntryFields {
            entry_date: self.entry_date.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            tag: self.tag.clone(),
            weather: self.weather.clone(),
        }
    }
}

impl EntryFields {
    /// Reads columns B..F from cells that start at column B.
    pub fn from_cells(cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
        EntryFields {
            entry_date: cell(0),
            title: cell(1),
            content: cell(2),
            tag: cell(3),
            weather: cell(4),
        }
    }

    /// Cell values in column order B, C, D, E, F.
    pub fn into_cells(self) -> Vec<String> {
        vec![
            self.entry_date,
            self.title,
            self.content,
            self.tag,
            self.weather,
        ]
    }
}

impl NewEntry {
    pub fn into_row(self, id: u64) -> Vec<String> {
        vec![
            id.to_string(),
            self.entry_date.format("%Y-%m-%d").to_string(),
            self.title,
            self.content,
            self.tag,
            self.weather,
        ]
    }
}
