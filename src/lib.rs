//! Health diary kept in a Google Sheets tab.
//!
//! `DiaryStore` wraps a [`sheets::SheetBackend`] with a time-expiring row
//! cache, keyword search, date lookup and row updates.

pub mod config;
pub mod diary_entry;
pub mod diary_store;
pub mod error;
pub mod locator;
pub mod pagination;
pub mod record_cache;
pub mod search;
pub mod sheet_range;
pub mod sheets;
pub mod writer;

pub use config::{BackendKind, Config};
pub use diary_entry::{DiaryEntry, EntryFields, NewEntry};
pub use diary_store::{DiaryStore, ProbeReport};
pub use error::{DiaryError, Result};
pub use locator::RowLocator;
pub use pagination::{paginate, Page, PAGE_SIZE};
pub use writer::WriteStrategy;
