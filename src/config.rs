//! Runtime configuration read from the environment.

use crate::error::{DiaryError, Result};
use crate::record_cache::DEFAULT_TTL;
use crate::sheet_range::CellRange;
use crate::sheets::SHEETS_API_BASE;
use crate::writer::WriteStrategy;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Sheets,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendKind,
    pub spreadsheet_id: String,
    pub access_token: String,
    /// `None` selects the spreadsheet's first tab.
    pub tab: Option<String>,
    pub cache_ttl: Duration,
    pub write_strategy: WriteStrategy,
    pub probe_cell: CellRange,
    pub api_base: String,
    pub log_file: String,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match var("DIARY_BACKEND").as_deref().map(str::trim) {
            None | Some("sheets") => BackendKind::Sheets,
            Some("memory") => BackendKind::Memory,
            Some(other) => {
                return Err(DiaryError::Config(format!(
                    "DIARY_BACKEND must be 'sheets' or 'memory', got '{}'",
                    other
                )))
            }
        };

        let spreadsheet_id = var("DIARY_SPREADSHEET_ID").unwrap_or_default();
        let access_token = var("GOOGLE_ACCESS_TOKEN").unwrap_or_default();
        if backend == BackendKind::Sheets {
            if spreadsheet_id.is_empty() {
                return Err(DiaryError::Config("DIARY_SPREADSHEET_ID is not set".to_string()));
            }
            if access_token.is_empty() {
                return Err(DiaryError::Auth("GOOGLE_ACCESS_TOKEN is not set".to_string()));
            }
        }

        let cache_ttl = match var("DIARY_CACHE_TTL_SECS") {
            Some(secs) => Duration::from_secs(secs.trim().parse().map_err(|_| {
                DiaryError::Config(format!("DIARY_CACHE_TTL_SECS is not a number: '{}'", secs))
            })?),
            None => DEFAULT_TTL,
        };

        let write_strategy = match var("DIARY_WRITE_STRATEGY") {
            Some(s) => s.parse()?,
            None => WriteStrategy::default(),
        };

        let probe_cell = match var("DIARY_PROBE_CELL") {
            Some(cell) => CellRange::parse_cell(&cell)?,
            None => CellRange::cell(1, 8),
        };

        Ok(Config {
            backend,
            spreadsheet_id,
            access_token,
            tab: var("DIARY_SHEET_TAB"),
            cache_ttl,
            write_strategy,
            probe_cell,
            api_base: var("SHEETS_API_BASE").unwrap_or_else(|| SHEETS_API_BASE.to_string()),
            log_file: var("DIARY_LOG_FILE").unwrap_or_else(|| "health_diary.log".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[
            ("DIARY_SPREADSHEET_ID", "abc"),
            ("GOOGLE_ACCESS_TOKEN", "tok"),
        ])
        .unwrap();
        assert_eq!(config.backend, BackendKind::Sheets);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.write_strategy, WriteStrategy::Range);
        assert_eq!(config.probe_cell, CellRange::cell(1, 8));
        assert_eq!(config.tab, None);
        assert_eq!(config.api_base, "https://sheets.googleapis.com/v4");
    }

    #[test]
    fn test_missing_credentials() {
        assert!(matches!(
            config(&[("DIARY_SPREADSHEET_ID", "abc")]),
            Err(DiaryError::Auth(_))
        ));
        assert!(matches!(
            config(&[("GOOGLE_ACCESS_TOKEN", "tok")]),
            Err(DiaryError::Config(_))
        ));
    }

    #[test]
    fn test_memory_backend_needs_no_credentials() {
        let config = config(&[
            ("DIARY_BACKEND", "memory"),
            ("DIARY_WRITE_STRATEGY", "cell"),
            ("DIARY_CACHE_TTL_SECS", "60"),
            ("DIARY_SHEET_TAB", "2024"),
        ])
        .unwrap();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.write_strategy, WriteStrategy::CellByCell);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.tab.as_deref(), Some("2024"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(config(&[("DIARY_BACKEND", "sqlite")]).is_err());
        assert!(config(&[("DIARY_BACKEND", "memory"), ("DIARY_CACHE_TTL_SECS", "soon")]).is_err());
        assert!(config(&[("DIARY_BACKEND", "memory"), ("DIARY_PROBE_CELL", "nope")]).is_err());
    }
}
