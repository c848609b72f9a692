//! Typed A1-notation ranges.
//!
//! Rows and columns are one-based, matching the spreadsheet. A range
//! without row bounds covers whole columns (`A:F`).

use crate::error::{DiaryError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub first_col: u32,
    pub last_col: u32,
    pub rows: Option<(u32, u32)>,
}

impl CellRange {
    /// Whole columns, every row.
    pub fn columns(first_col: u32, last_col: u32) -> Self {
        CellRange {
            first_col,
            last_col,
            rows: None,
        }
    }

    pub fn row_span(row: u32, first_col: u32, last_col: u32) -> Self {
        CellRange {
            first_col,
            last_col,
            rows: Some((row, row)),
        }
    }

    pub fn cell(row: u32, col: u32) -> Self {
        Self::row_span(row, col, col)
    }

    /// Parses a single-cell reference such as `H1` or `aa12`.
    pub fn parse_cell(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        let split = reference
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| DiaryError::Config(format!("'{}' has no row number", reference)))?;
        let (letters, digits) = reference.split_at(split);
        let col = column_index(letters)
            .ok_or_else(|| DiaryError::Config(format!("'{}' has no column letters", reference)))?;
        let row: u32 = digits
            .parse()
            .map_err(|_| DiaryError::Config(format!("'{}' is not a cell reference", reference)))?;
        if row == 0 {
            return Err(DiaryError::Config(format!("'{}' has row 0", reference)));
        }
        Ok(Self::cell(row, col))
    }

    /// Range text prefixed with the quoted tab title: `'Sheet 1'!B3:F3`.
    pub fn qualified(&self, tab: &str) -> String {
        format!("'{}'!{}", tab.replace('\'', "''"), self)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = column_letters(self.first_col);
        let last = column_letters(self.last_col);
        match self.rows {
            None => write!(f, "{}:{}", first, last),
            Some((top, bottom)) if top == bottom && self.first_col == self.last_col => {
                write!(f, "{}{}", first, top)
            }
            Some((top, bottom)) => write!(f, "{}{}:{}{}", first, top, last, bottom),
        }
    }
}

/// 1 -> `A`, 26 -> `Z`, 27 -> `AA`.
pub fn column_letters(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, c| {
        if c.is_ascii_alphabetic() {
            let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
            acc.checked_mul(26)?.checked_add(digit)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(6), "F");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(703), "AAA");
        assert_eq!(column_index("aa"), Some(27));
        assert_eq!(column_index("H"), Some(8));
        assert_eq!(column_index("H1"), None);
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(CellRange::columns(1, 6).to_string(), "A:F");
        assert_eq!(CellRange::row_span(3, 2, 6).to_string(), "B3:F3");
        assert_eq!(CellRange::cell(1, 8).to_string(), "H1");
    }

    #[test]
    fn test_qualified_quotes_tab() {
        assert_eq!(
            CellRange::row_span(3, 2, 6).qualified("Bob's diary"),
            "'Bob''s diary'!B3:F3"
        );
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(CellRange::parse_cell("H1").unwrap(), CellRange::cell(1, 8));
        assert_eq!(CellRange::parse_cell(" ab12 ").unwrap(), CellRange::cell(12, 28));
        assert!(CellRange::parse_cell("H").is_err());
        assert!(CellRange::parse_cell("12").is_err());
        assert!(CellRange::parse_cell("H0").is_err());
        assert!(CellRange::parse_cell("H1:B2").is_err());
    }
}
