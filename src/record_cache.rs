//! Time-expiring cache of a tab's rows.
//!
//! Holds the whole table per tab. Writes never patch the cached copy;
//! callers invalidate and the next `load` fetches everything again.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use moka::future::Cache;

use crate::diary_entry::DiaryEntry;
use crate::error::Result;

/// Default expiry of a loaded table.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300); // 5 min

pub type Table = Arc<Vec<DiaryEntry>>;

pub struct RecordCache {
    /// key = tab title
    tables: Cache<String, Table>,
}

impl RecordCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            tables: Cache::builder().time_to_live(ttl).max_capacity(16).build(),
        }
    }

    /// Returns the cached table for `tab`, or runs `fetch` and caches its result.
    /// A failed fetch caches nothing.
    pub async fn load<F, Fut>(&self, tab: &str, fetch: F) -> Result<Table>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<DiaryEntry>>>,
    {
        if let Some(table) = self.tables.get(tab).await {
            debug!("cache hit for tab '{}' ({} rows)", tab, table.len());
            return Ok(table);
        }

        let table: Table = Arc::new(fetch().await?);
        self.tables.insert(tab.to_string(), table.clone()).await;
        Ok(table)
    }

    pub async fn invalidate(&self, tab: &str) {
        debug!("cache invalidated for tab '{}'", tab);
        self.tables.invalidate(tab).await;
    }

    #[cfg(test)]
    pub async fn is_cached(&self, tab: &str) -> bool {
        self.tables.get(tab).await.is_some()
    }
}

impl Default for RecordCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
