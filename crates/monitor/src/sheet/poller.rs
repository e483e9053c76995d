//! Command polling against the sheet.

use serde_json::{json, Value};

use crate::command::{CommandRow, CommandStatus};
use crate::error::SheetError;
use crate::sheet::SheetsClient;

/// Result of one poll pass.
#[derive(Debug)]
pub struct PollOutcome {
    /// Pending rows in ascending row order.
    pub rows: Vec<CommandRow>,

    /// Cursor after this pass. Counts every row read, pending or not, so
    /// past rows are never read twice.
    pub next_cursor: u32,
}

/// Reads unprocessed command rows from the sheet.
pub struct CommandPoller {
    client: SheetsClient,
}

impl CommandPoller {
    pub fn new(client: SheetsClient) -> Self {
        Self { client }
    }

    /// Read all rows strictly after `cursor` and pick out the pending ones.
    ///
    /// Rows with fewer than five cells or a non-pending status are
    /// silently ignored. A parameter cell that fails to decode drops the
    /// row from the result but still advances the cursor past it; the row
    /// is never retried. On a transport error the caller keeps its old
    /// cursor and the same interval is retried next cycle.
    pub async fn poll(&self, cursor: u32) -> Result<PollOutcome, SheetError> {
        let values = self.client.read_rows_after(cursor).await?;
        let next_cursor = cursor + values.len() as u32;

        let mut rows = Vec::new();
        for (i, cells) in values.iter().enumerate() {
            let source_row = cursor + i as u32 + 1;
            if cells.len() < 5 || !CommandStatus::Pending.matches(&cells[4]) {
                continue;
            }

            let params = if cells[2].trim().is_empty() {
                json!({})
            } else {
                match serde_json::from_str::<Value>(&cells[2]) {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::error!(
                            row = source_row,
                            error = %e,
                            "Invalid JSON in parameters column"
                        );
                        continue;
                    }
                }
            };

            rows.push(CommandRow {
                id: cells[0].clone(),
                action: cells[1].clone(),
                params,
                timestamp: cells[3].clone(),
                source_row,
            });
        }

        if !rows.is_empty() {
            tracing::debug!(count = rows.len(), next_cursor, "Found pending commands");
        }

        Ok(PollOutcome { rows, next_cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::StaticTokenSource;
    use mockito::Server;
    use std::sync::Arc;

    fn poller(base_url: &str) -> CommandPoller {
        CommandPoller::new(
            SheetsClient::new(
                Arc::new(StaticTokenSource("test-token")),
                "sheet-1",
                "Commands",
            )
            .with_base_url(base_url),
        )
    }

    #[tokio::test]
    async fn test_poll_filters_to_pending_rows() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/spreadsheets/sheet-1/values/Commands!A2:E")
            .with_status(200)
            .with_body(
                json!({
                    "values": [
                        ["1", "on", "{}", "ts", "completed"],
                        ["2", "off", "{}", "ts", "Pending"],
                        ["3", "on", "{}", "ts", "failed"],
                        ["4", "on", "{}", "ts"],
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let outcome = poller(&server.url()).poll(1).await.unwrap();
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].id, "2");
        assert_eq!(outcome.rows[0].source_row, 3);
        // The cursor advances past every row read, qualifying or not.
        assert_eq!(outcome.next_cursor, 5);
    }

    #[tokio::test]
    async fn test_poll_skips_bad_json_but_advances_cursor() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/spreadsheets/sheet-1/values/Commands!A2:E")
            .with_status(200)
            .with_body(
                json!({
                    "values": [
                        ["1", "on", "{not json", "ts", "pending"],
                        ["2", "on", r#"{"light_name": "booth"}"#, "ts", "pending"],
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let outcome = poller(&server.url()).poll(1).await.unwrap();
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].id, "2");
        assert_eq!(outcome.next_cursor, 3);
    }

    #[tokio::test]
    async fn test_poll_empty_params_cell_becomes_empty_object() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/spreadsheets/sheet-1/values/Commands!A2:E")
            .with_status(200)
            .with_body(
                json!({
                    "values": [["1", "on", "", "ts", "pending"]]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let outcome = poller(&server.url()).poll(1).await.unwrap();
        assert_eq!(outcome.rows[0].params, json!({}));
    }

    #[tokio::test]
    async fn test_poll_empty_sheet_keeps_cursor() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/spreadsheets/sheet-1/values/Commands!A8:E")
            .with_status(200)
            .with_body(json!({"range": "Commands!A8:E"}).to_string())
            .create_async()
            .await;

        let outcome = poller(&server.url()).poll(7).await.unwrap();
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.next_cursor, 7);
    }

    #[tokio::test]
    async fn test_poll_transport_error_surfaces() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/spreadsheets/sheet-1/values/Commands!A2:E")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        assert!(poller(&server.url()).poll(1).await.is_err());
    }
}
