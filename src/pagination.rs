pub const PAGE_SIZE: usize = 50;

/// One page of a row set.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub rows: &'a [T],
    /// 1-based page number actually served.
    pub number: usize,
    /// Index of the first row of the page within the full set.
    pub start: usize,
    pub total: usize,
}

impl<'a, T> Page<'a, T> {
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(PAGE_SIZE).max(1)
    }

    /// `showing 51–100 of 120`
    pub fn summary(&self) -> String {
        if self.rows.is_empty() {
            format!("showing 0 of {}", self.total)
        } else {
            format!(
                "showing {}–{} of {}",
                self.start + 1,
                self.start + self.rows.len(),
                self.total
            )
        }
    }
}

/// Rows `[(page-1)*PAGE_SIZE, page*PAGE_SIZE)` clamped to `rows`. Page 0 is
/// served as page 1; pages past the end are empty.
pub fn paginate<T>(rows: &[T], page: usize) -> Page<'_, T> {
    let number = page.max(1);
    let start = (number - 1)
        .checked_mul(PAGE_SIZE)
        .map_or(rows.len(), |start| start.min(rows.len()));
    let end = (start + PAGE_SIZE).min(rows.len());
    Page {
        rows: &rows[start..end],
        number,
        start,
        total: rows.len(),
    }
}
