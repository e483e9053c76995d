//! Google Sheets API client.
//!
//! Thin typed wrapper over the `values` endpoints of the Sheets REST API,
//! covering exactly what the command sheet needs: ranged reads, the
//! header check, and single-cell status writes.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::command::CommandStatus;
use crate::error::SheetError;
use crate::sheet::TokenSource;

/// Default Sheets API endpoint.
const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Request timeout for every Sheets call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Header row the command sheet must carry, verbatim.
pub const COMMAND_HEADERS: [&str; 5] =
    ["Command ID", "Action", "Parameters", "Timestamp", "Status"];

/// Response body of a `values.get` call.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// HTTP client for the spreadsheet holding the command log.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    token: Arc<dyn TokenSource>,
    spreadsheet_id: String,
    sheet_name: String,
}

impl SheetsClient {
    /// Create a client for one sheet within one spreadsheet.
    pub fn new(token: Arc<dyn TokenSource>, spreadsheet_id: &str, sheet_name: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            token,
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_name: sheet_name.to_string(),
        }
    }

    /// Point the client at a different API endpoint.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}!{}",
            self.base_url, self.spreadsheet_id, self.sheet_name, range
        )
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetError> {
        let token = self.token.access_token().await?;
        let response = self
            .http
            .get(self.values_url(range))
            .bearer_auth(&token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Api { status, body });
        }

        let range: ValueRange = response.json().await?;
        Ok(range.values)
    }

    async fn update_values(
        &self,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetError> {
        let token = self.token.access_token().await?;
        let response = self
            .http
            .put(self.values_url(range))
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": values }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Api { status, body });
        }

        Ok(())
    }

    /// Make sure the sheet carries the expected header row.
    pub async fn ensure_headers(&self) -> Result<(), SheetError> {
        let rows = self.get_values("A1:E1").await?;
        let present = rows
            .first()
            .is_some_and(|row| row.iter().map(String::as_str).eq(COMMAND_HEADERS));

        if !present {
            let header = COMMAND_HEADERS.iter().map(|h| h.to_string()).collect();
            self.update_values("A1:E1", vec![header]).await?;
            tracing::info!(sheet = %self.sheet_name, "Created headers in the command sheet");
        }

        Ok(())
    }

    /// Read every row strictly after `row`, columns A through E.
    pub async fn read_rows_after(&self, row: u32) -> Result<Vec<Vec<String>>, SheetError> {
        self.get_values(&format!("A{}:E", row + 1)).await
    }

    /// Write a terminal status into the Status column of `row`.
    ///
    /// A plain cell overwrite: writing the same status twice is a no-op.
    pub async fn update_status(&self, row: u32, status: CommandStatus) -> Result<(), SheetError> {
        self.update_values(&format!("E{}", row), vec![vec![status.as_str().to_string()]])
            .await?;
        tracing::info!(row, status = %status, "Updated command status");
        Ok(())
    }
}
