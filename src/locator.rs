use crate::diary_entry::DiaryEntry;
use std::fmt;

/// Storage row of a data entry. Row 1 is the header, so the first data
/// row is 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowLocator(u32);

pub const HEADER_ROWS: u32 = 1;

impl RowLocator {
    /// `None` for rows at or above the header.
    pub fn new(row: u32) -> Option<Self> {
        (row > HEADER_ROWS).then_some(RowLocator(row))
    }

    pub fn from_cache_index(index: usize) -> Self {
        RowLocator(index as u32 + HEADER_ROWS + 1)
    }

    pub fn row(self) -> u32 {
        self.0
    }

    pub fn cache_index(self) -> usize {
        (self.0 - HEADER_ROWS - 1) as usize
    }
}

impl fmt::Display for RowLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.0)
    }
}

/// First row whose `entry_date` equals `date`. Later rows sharing the date
/// are never returned.
pub fn locate(entries: &[DiaryEntry], date: &str) -> Option<RowLocator> {
    let date = date.trim();
    entries
        .iter()
        .position(|entry| entry.entry_date == date)
        .map(RowLocator::from_cache_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dated(dates: &[&str]) -> Vec<DiaryEntry> {
        dates
            .iter()
            .enumerate()
            .map(|(i, d)| DiaryEntry {
                id: Some(i as u64 + 1),
                entry_date: d.to_string(),
                title: String::new(),
                content: String::new(),
                tag: String::new(),
                weather: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_locate_second_row() {
        let rows = dated(&["2024-01-01", "2024-01-02"]);
        assert_eq!(locate(&rows, "2024-01-02").map(RowLocator::row), Some(3));
        assert_eq!(locate(&rows, " 2024-01-01 ").map(RowLocator::row), Some(2));
    }

    #[test]
    fn test_duplicate_dates_resolve_to_first() {
        let rows = dated(&["2024-01-01", "2024-01-05", "2024-01-05"]);
        assert_eq!(locate(&rows, "2024-01-05").map(RowLocator::row), Some(3));
    }

    #[test]
    fn test_miss() {
        let rows = dated(&["2024-01-01"]);
        assert_eq!(locate(&rows, "2024-02-01"), None);
        assert_eq!(locate(&[], "2024-02-01"), None);
    }

    #[test]
    fn test_header_is_not_a_locator() {
        assert_eq!(RowLocator::new(0), None);
        assert_eq!(RowLocator::new(1), None);
        assert_eq!(RowLocator::new(2).map(RowLocator::cache_index), Some(0));
    }

    proptest! {
        #[test]
        fn prop_storage_row_is_index_plus_two(index in 0usize..100_000) {
            let locator = RowLocator::from_cache_index(index);
            prop_assert_eq!(locator.row() as usize, index + 2);
            prop_assert_eq!(locator.cache_index(), index);
        }
    }
}
