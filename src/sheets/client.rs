//! Google Sheets v4 REST client

use super::types::{ApiErrorBody, SpreadsheetMeta, ValueRange};
use super::SheetBackend;
use crate::diary_entry::COLUMNS;
use crate::error::{DiaryError, Result};
use crate::sheet_range::CellRange;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sheets API client bound to one spreadsheet.
pub struct SheetsClient {
    http: Client,
    base_url: String,
    spreadsheet_id: String,
    access_token: String,
}

impl SheetsClient {
    pub fn new(spreadsheet_id: String, access_token: String) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: SHEETS_API_BASE.to_string(),
            spreadsheet_id,
            access_token,
        })
    }

    /// Point the client at another API root (proxies, emulators).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn values_url(&self, qualified_range: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url,
            self.spreadsheet_id,
            urlencoding::encode(qualified_range)
        )
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/spreadsheets/{}", self.base_url, self.spreadsheet_id)
    }
}

/// Turns a non-success response into `Auth` or `Api`.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => match parsed.error.status {
            Some(code) => format!("{} ({})", parsed.error.message, code),
            None => parsed.error.message,
        },
        Err(_) => body,
    };

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(DiaryError::Auth(message))
    } else {
        Err(DiaryError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SheetBackend for SheetsClient {
    async fn tab_titles(&self) -> Result<Vec<String>> {
        let response = self
            .http
            .get(self.spreadsheet_url())
            .bearer_auth(&self.access_token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;

        let meta: SpreadsheetMeta = check(response).await?.json().await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    async fn read_range(&self, tab: &str, range: CellRange) -> Result<Vec<Vec<String>>> {
        let qualified = range.qualified(tab);
        debug!("GET values {}", qualified);

        let response = self
            .http
            .get(self.values_url(&qualified))
            .bearer_auth(&self.access_token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await?;

        let values: ValueRange = check(response).await?.json().await?;
        Ok(values.into_text())
    }

    async fn write_range(
        &self,
        tab: &str,
        range: CellRange,
        rows: Vec<Vec<String>>,
    ) -> Result<()> {
        let qualified = range.qualified(tab);
        debug!("PUT values {}", qualified);

        let response = self
            .http
            .put(self.values_url(&qualified))
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueRange::rows(qualified, rows))
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn append_row(&self, tab: &str, row: Vec<String>) -> Result<()> {
        let qualified = CellRange::columns(1, COLUMNS.len() as u32).qualified(tab);
        debug!("POST append {}", qualified);

        let response = self
            .http
            .post(format!("{}:append", self.values_url(&qualified)))
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&ValueRange::rows(qualified, vec![row]))
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}
