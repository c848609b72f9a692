use crate::diary_entry::{ColumnMap, DiaryEntry, EntryFields, NewEntry, COLUMNS};
use crate::error::{DiaryError, Result};
use crate::locator::{self, RowLocator};
use crate::record_cache::{RecordCache, Table, DEFAULT_TTL};
use crate::search;
use crate::sheet_range::CellRange;
use crate::sheets::SheetBackend;
use crate::writer::{self, WriteStrategy, FIRST_EDIT_COLUMN, LAST_EDIT_COLUMN};
use chrono::Local;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Result of the diagnostic write-then-read against the probe cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub cell: CellRange,
    pub written: String,
    pub read_back: String,
}

impl ProbeReport {
    pub fn matches(&self) -> bool {
        self.written == self.read_back
    }
}

/// The diary's view of one spreadsheet tab.
pub struct DiaryStore {
    backend: Arc<dyn SheetBackend>,
    tab: String,
    cache: RecordCache,
    strategy: WriteStrategy,
    probe_cell: CellRange,
}

impl DiaryStore {
    pub fn new(backend: Arc<dyn SheetBackend>, tab: &str) -> Self {
        DiaryStore {
            backend,
            tab: tab.to_string(),
            cache: RecordCache::new(DEFAULT_TTL),
            strategy: WriteStrategy::default(),
            probe_cell: CellRange::cell(1, 8),
        }
    }

    /// Opens `tab`, or the first tab when `None`. Fails when the tab does
    /// not exist or the backend rejects the credentials.
    pub async fn connect(backend: Arc<dyn SheetBackend>, tab: Option<&str>) -> Result<Self> {
        let titles = backend.tab_titles().await?;
        let tab = match tab {
            Some(wanted) if titles.iter().any(|t| t == wanted) => wanted.to_string(),
            Some(wanted) => {
                return Err(DiaryError::Config(format!("no tab named '{}'", wanted)));
            }
            None => titles
                .into_iter()
                .next()
                .ok_or_else(|| DiaryError::Config("spreadsheet has no tabs".to_string()))?,
        };
        info!("connected to tab '{}'", tab);
        Ok(Self::new(backend, &tab))
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = RecordCache::new(ttl);
        self
    }

    pub fn with_write_strategy(mut self, strategy: WriteStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_probe_cell(mut self, cell: CellRange) -> Self {
        self.probe_cell = cell;
        self
    }

    pub fn tab(&self) -> &str {
        &self.tab
    }

    /// All data rows of the current tab, from cache when fresh.
    pub async fn load(&self) -> Result<Table> {
        self.cache.load(&self.tab, || self.fetch()).await
    }

    async fn fetch(&self) -> Result<Vec<DiaryEntry>> {
        let rows = self
            .backend
            .read_range(&self.tab, CellRange::columns(1, COLUMNS.len() as u32))
            .await?;

        let Some((header, data)) = rows.split_first() else {
            info!("tab '{}' is empty", self.tab);
            return Ok(Vec::new());
        };

        let columns = ColumnMap::from_header(header);
        let missing = columns.missing();
        if !missing.is_empty() {
            warn!(
                "tab '{}' header lacks {:?}; filling with empty values",
                self.tab, missing
            );
        }

        // Blank rows are kept so cache index + 2 stays the storage row.
        let entries: Vec<DiaryEntry> = data
            .iter()
            .map(|row| DiaryEntry::from_row(&columns, row))
            .collect();
        info!("loaded {} rows from tab '{}'", entries.len(), self.tab);
        Ok(entries)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<DiaryEntry>> {
        let table = self.load().await?;
        Ok(search::filter_entries(&table, query)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn locate(&self, date: &str) -> Result<Option<RowLocator>> {
        let table = self.load().await?;
        let found = locator::locate(&table, date);
        if found.is_none() {
            warn!("no entry dated '{}' in tab '{}'", date.trim(), self.tab);
        }
        Ok(found)
    }

    /// Validates a raw storage row number typed by the user. Rows past the
    /// one just below the last loaded row are rejected.
    pub async fn locator_for_row(&self, row: u32) -> Result<RowLocator> {
        let table = self.load().await?;
        let last = table.len() as u64 + locator::HEADER_ROWS as u64 + 1;
        if u64::from(row) > last {
            warn!("row {} is past the end of tab '{}' (last {})", row, self.tab, last);
            return Err(DiaryError::InvalidLocator(row));
        }
        RowLocator::new(row).ok_or(DiaryError::InvalidLocator(row))
    }

    /// Columns B..F of `locator` read straight from storage.
    pub async fn read_row(&self, locator: RowLocator) -> Result<EntryFields> {
        let range = CellRange::row_span(locator.row(), FIRST_EDIT_COLUMN, LAST_EDIT_COLUMN);
        let rows = self.backend.read_range(&self.tab, range).await?;
        Ok(EntryFields::from_cells(rows.first().map(Vec::as_slice).unwrap_or(&[])))
    }

    /// Writes B..F of `locator`. The cache is dropped whether or not the
    /// write went through, since a cell-by-cell write can fail half done.
    pub async fn update(&self, locator: RowLocator, fields: EntryFields) -> Result<()> {
        let result =
            writer::write_fields(self.backend.as_ref(), &self.tab, locator, fields, self.strategy)
                .await;
        self.cache.invalidate(&self.tab).await;

        match &result {
            Ok(()) => info!("updated {} of tab '{}'", locator, self.tab),
            Err(e) => error!("update of {} in tab '{}' failed: {}", locator, self.tab, e),
        }
        result
    }

    /// Appends a row with id = current row count + 1 and returns the id.
    /// A tab without a header row gets one first.
    pub async fn append(&self, entry: NewEntry) -> Result<u64> {
        let table = self.load().await?;
        if table.is_empty() {
            self.ensure_header().await?;
        }
        let id = table.len() as u64 + 1;
        let result = self.backend.append_row(&self.tab, entry.into_row(id)).await;
        self.cache.invalidate(&self.tab).await;

        match &result {
            Ok(()) => info!("appended entry {} to tab '{}'", id, self.tab),
            Err(e) => error!("append to tab '{}' failed: {}", self.tab, e),
        }
        result.map(|()| id)
    }

    async fn ensure_header(&self) -> Result<()> {
        let header_range = CellRange::row_span(1, 1, COLUMNS.len() as u32);
        let existing = self.backend.read_range(&self.tab, header_range).await?;
        if existing.iter().any(|row| row.iter().any(|cell| !cell.is_empty())) {
            return Ok(());
        }
        info!("tab '{}' has no header row; writing one", self.tab);
        let header = COLUMNS.iter().map(|c| c.to_string()).collect();
        self.backend
            .write_range(&self.tab, header_range, vec![header])
            .await
    }

    /// The last `n` rows of the tab, oldest first.
    pub async fn recent(&self, n: usize) -> Result<Vec<DiaryEntry>> {
        let table = self.load().await?;
        Ok(table[table.len().saturating_sub(n)..].to_vec())
    }

    pub async fn tabs(&self) -> Result<Vec<String>> {
        self.backend.tab_titles().await
    }

    pub async fn select_tab(&mut self, tab: &str) -> Result<()> {
        if !self.tabs().await?.iter().any(|t| t == tab) {
            return Err(DiaryError::Config(format!("no tab named '{}'", tab)));
        }
        info!("switching from tab '{}' to '{}'", self.tab, tab);
        self.tab = tab.to_string();
        Ok(())
    }

    /// Drops the cached rows of the current tab.
    pub async fn refresh(&self) {
        self.cache.invalidate(&self.tab).await;
    }

    /// Writes a timestamp to the probe cell and reads it back.
    pub async fn probe(&self) -> Result<ProbeReport> {
        let written = format!("probe {}", Local::now().to_rfc3339());
        self.backend
            .write_range(&self.tab, self.probe_cell, vec![vec![written.clone()]])
            .await?;
        let rows = self.backend.read_range(&self.tab, self.probe_cell).await?;
        let read_back = rows
            .first()
            .and_then(|row| row.first())
            .cloned()
            .unwrap_or_default();

        let report = ProbeReport {
            cell: self.probe_cell,
            written,
            read_back,
        };
        info!("probe of {} matched: {}", report.cell, report.matches());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::MemorySheet;
    use chrono::NaiveDate;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn header() -> Vec<String> {
        strings(&COLUMNS)
    }

    fn new_entry(title: &str) -> NewEntry {
        NewEntry {
            entry_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            title: title.to_string(),
            content: String::new(),
            tag: String::new(),
            weather: String::new(),
        }
    }

    #[tokio::test]
    async fn test_connect_picks_first_tab() {
        let sheet = MemorySheet::new()
            .with_tab("2024", vec![header()])
            .with_tab("2025", vec![header()]);
        let store = DiaryStore::connect(Arc::new(sheet), None).await.unwrap();
        assert_eq!(store.tab(), "2024");
    }

    #[tokio::test]
    async fn test_connect_unknown_tab_fails() {
        let sheet = MemorySheet::diary("Sheet1");
        let result = DiaryStore::connect(Arc::new(sheet), Some("Other")).await;
        assert!(matches!(result, Err(DiaryError::Config(_))));

        let empty = DiaryStore::connect(Arc::new(MemorySheet::new()), None).await;
        assert!(empty.is_err());
    }

    #[tokio::test]
    async fn test_append_assigns_count_plus_one_and_invalidates() {
        let sheet = Arc::new(MemorySheet::diary("Sheet1"));
        let store = DiaryStore::new(sheet.clone(), "Sheet1");

        assert_eq!(store.append(new_entry("first")).await.unwrap(), 1);
        assert_eq!(store.append(new_entry("second")).await.unwrap(), 2);

        let table = store.load().await.unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[1].id, Some(2));
        assert_eq!(table[1].entry_date, "2024-02-01");
        assert_eq!(sheet.rows("Sheet1").unwrap()[2][2], "second");
    }

    #[tokio::test]
    async fn test_blank_rows_keep_locator_alignment() {
        let sheet = MemorySheet::new().with_tab(
            "Sheet1",
            vec![
                header(),
                strings(&["1", "2024-01-01"]),
                vec![],
                strings(&["3", "2024-01-03"]),
            ],
        );
        let store = DiaryStore::new(Arc::new(sheet), "Sheet1");
        let locator = store.locate("2024-01-03").await.unwrap().unwrap();
        assert_eq!(locator.row(), 4);
        assert_eq!(store.read_row(locator).await.unwrap().entry_date, "2024-01-03");
    }

    #[tokio::test]
    async fn test_empty_and_headerless_tabs() {
        let store = DiaryStore::new(Arc::new(MemorySheet::new().with_tab("Sheet1", vec![])), "Sheet1");
        assert!(store.load().await.unwrap().is_empty());
        assert_eq!(store.locate("2024-01-01").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_recent_returns_tail() {
        let sheet = Arc::new(MemorySheet::diary("Sheet1"));
        let store = DiaryStore::new(sheet, "Sheet1");
        for title in ["a", "b", "c"] {
            store.append(new_entry(title)).await.unwrap();
        }
        let recent = store.recent(2).await.unwrap();
        let titles: Vec<_> = recent.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c"]);
        assert_eq!(store.recent(100).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_select_tab_switches_rows() {
        let sheet = MemorySheet::new()
            .with_tab("2024", vec![header(), strings(&["1", "2024-05-05", "old"])])
            .with_tab("2025", vec![header()]);
        let mut store = DiaryStore::new(Arc::new(sheet), "2024");
        assert_eq!(store.load().await.unwrap().len(), 1);

        store.select_tab("2025").await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
        assert!(store.select_tab("2026").await.is_err());
        assert_eq!(store.tab(), "2025");
    }

    #[tokio::test]
    async fn test_probe_round_trips() {
        let sheet = Arc::new(MemorySheet::diary("Sheet1"));
        let store = DiaryStore::new(sheet.clone(), "Sheet1").with_probe_cell(CellRange::cell(1, 9));

        let report = store.probe().await.unwrap();
        assert!(report.matches());
        assert!(report.written.starts_with("probe "));
        assert_eq!(sheet.rows("Sheet1").unwrap()[0][8], report.written);
    }

    #[tokio::test]
    async fn test_failed_update_still_invalidates() {
        let sheet = Arc::new(MemorySheet::new().with_tab(
            "Sheet1",
            vec![header(), strings(&["1", "2024-01-01", "Run", "", "", "Sunny"])],
        ));
        let store = DiaryStore::new(sheet.clone(), "Sheet1")
            .with_write_strategy(WriteStrategy::CellByCell);
        let locator = store.locate("2024-01-01").await.unwrap().unwrap();

        sheet.fail_writes_after(1).unwrap();
        let mut fields = store.read_row(locator).await.unwrap();
        fields.entry_date = "2024-01-10".to_string();
        fields.weather = "Rain".to_string();
        assert!(store.update(locator, fields).await.is_err());

        let table = store.load().await.unwrap();
        assert_eq!(table[0].entry_date, "2024-01-10");
        assert_eq!(table[0].weather, "Sunny");
    }

    #[tokio::test]
    async fn test_locator_for_row() {
        let sheet = MemorySheet::new().with_tab(
            "Sheet1",
            vec![
                header(),
                strings(&["1", "2024-01-01"]),
                strings(&["2", "2024-01-02"]),
                strings(&["3", "2024-01-03"]),
            ],
        );
        let store = DiaryStore::new(Arc::new(sheet), "Sheet1");
        assert!(matches!(store.locator_for_row(1).await, Err(DiaryError::InvalidLocator(1))));
        assert_eq!(store.locator_for_row(4).await.unwrap().row(), 4);
        // One past the last data row is the next free row.
        assert_eq!(store.locator_for_row(5).await.unwrap().row(), 5);
    }

    #[tokio::test]
    async fn test_locator_for_row_rejects_rows_past_the_end() {
        let sheet = Arc::new(MemorySheet::new().with_tab(
            "Sheet1",
            vec![header(), strings(&["1", "2024-01-01"])],
        ));
        let store = DiaryStore::new(sheet.clone(), "Sheet1");
        assert!(matches!(store.locator_for_row(4).await, Err(DiaryError::InvalidLocator(4))));
        assert!(matches!(
            store.locator_for_row(4_000_000_000).await,
            Err(DiaryError::InvalidLocator(4_000_000_000))
        ));
        assert!(matches!(
            store.locator_for_row(u32::MAX).await,
            Err(DiaryError::InvalidLocator(u32::MAX))
        ));
        assert_eq!(sheet.rows("Sheet1").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_append_to_headerless_tab_writes_header_first() {
        let sheet = Arc::new(MemorySheet::new().with_tab("Sheet1", vec![]));
        let store = DiaryStore::new(sheet.clone(), "Sheet1");

        assert_eq!(store.append(new_entry("first")).await.unwrap(), 1);
        assert_eq!(store.append(new_entry("second")).await.unwrap(), 2);

        let rows = sheet.rows("Sheet1").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], header());
        assert_eq!(rows[1][2], "first");

        let table = store.load().await.unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].id, Some(1));
        assert_eq!(table[0].title, "first");
    }

    #[tokio::test]
    async fn test_append_to_header_only_tab_keeps_single_header() {
        let sheet = Arc::new(MemorySheet::diary("Sheet1"));
        let store = DiaryStore::new(sheet.clone(), "Sheet1");
        store.append(new_entry("only")).await.unwrap();

        let rows = sheet.rows("Sheet1").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], header());
    }

    #[tokio::test]
    async fn test_header_lands_in_row_one_beside_other_cells() {
        let sheet = Arc::new(MemorySheet::new().with_tab(
            "Sheet1",
            vec![strings(&["", "", "", "", "", "", "", "note"])],
        ));
        let store = DiaryStore::new(sheet.clone(), "Sheet1");
        store.append(new_entry("first")).await.unwrap();

        let rows = sheet.rows("Sheet1").unwrap();
        assert_eq!(rows[0][..6], header()[..]);
        assert_eq!(rows[0][7], "note");
        assert_eq!(store.load().await.unwrap()[0].title, "first");
    }
}
