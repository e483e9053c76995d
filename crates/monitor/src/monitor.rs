//! The polling loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::command::{Command, CommandStatus};
use crate::config::MonitorConfig;
use crate::cursor::CursorStore;
use crate::hub::{CommandDispatcher, HubClient};
use crate::sheet::{CommandPoller, ServiceAccountTokenSource, SheetsClient};

/// Exponential backoff for failed cycles.
///
/// Doubles per consecutive failure up to the cap and resets after one
/// successful cycle.
#[derive(Debug)]
struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            current: base,
        }
    }

    /// The delay to sleep after the latest failure.
    fn next(&mut self) -> Duration {
        self.current = std::cmp::min(self.current * 2, self.max);
        self.current
    }

    fn reset(&mut self) {
        self.current = self.base;
    }
}

/// The monitor process: polls the sheet and relays commands to the hub.
pub struct Monitor {
    poller: CommandPoller,
    sheets: SheetsClient,
    dispatcher: CommandDispatcher,
    cursor_store: CursorStore,
    cursor: u32,
    poll_interval: Duration,
    backoff: Backoff,
}

impl Monitor {
    /// Wire up clients from configuration. Any failure here is fatal.
    pub async fn new(config: MonitorConfig) -> Result<Self> {
        let token = Arc::new(ServiceAccountTokenSource::from_file(
            &config.google.credentials_file,
        )?);
        let sheets = SheetsClient::new(
            token,
            &config.google.spreadsheet_id,
            &config.google.sheet_name,
        );
        sheets.ensure_headers().await?;

        let hub = HubClient::new(&config.home_assistant.url, &config.home_assistant.token);
        let dispatcher = CommandDispatcher::new(hub, config.home_assistant.lights.clone());

        let cursor_store = CursorStore::new(&config.cursor_file);
        let cursor = cursor_store.load()?;

        tracing::info!(
            cursor,
            spreadsheet_id = %config.google.spreadsheet_id,
            hub_url = %config.home_assistant.url,
            "Monitor initialized"
        );

        Ok(Self {
            poller: CommandPoller::new(sheets.clone()),
            sheets,
            dispatcher,
            cursor_store,
            cursor,
            poll_interval: config.poll_interval(),
            backoff: Backoff::new(config.poll_interval(), config.error_backoff_cap()),
        })
    }

    /// Run the poll-dispatch loop until the task is cancelled.
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!("Starting monitor loop");

        loop {
            match self.cycle().await {
                Ok(()) => {
                    self.backoff.reset();
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(e) => {
                    let delay = self.backoff.next();
                    tracing::error!(
                        error = %e,
                        delay_secs = delay.as_secs(),
                        "Cycle failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// One poll-dispatch-update pass.
    ///
    /// Commands are handled strictly in row order; dispatch and status
    /// write-back for one row complete before the next row starts. The
    /// cursor is persisted only after the whole batch was handled, so a
    /// crash mid-cycle replays the batch and the pending filter drops
    /// whatever already reached a terminal status.
    async fn cycle(&mut self) -> Result<()> {
        let outcome = self.poller.poll(self.cursor).await?;

        for row in outcome.rows {
            let source_row = row.source_row;
            let status = match Command::from_row(&row) {
                Ok(command) => {
                    tracing::info!(
                        command_id = %command.id,
                        action = ?command.action,
                        row = source_row,
                        "Processing command"
                    );
                    if self.dispatcher.dispatch(&command).await {
                        CommandStatus::Completed
                    } else {
                        CommandStatus::Failed
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        command_id = %row.id,
                        row = source_row,
                        error = %e,
                        "Rejected command"
                    );
                    CommandStatus::Failed
                }
            };

            if let Err(e) = self.sheets.update_status(source_row, status).await {
                tracing::error!(row = source_row, error = %e, "Error updating command status");
            }
        }

        if outcome.next_cursor != self.cursor {
            self.cursor = outcome.next_cursor;
            if let Err(e) = self.cursor_store.save(self.cursor) {
                tracing::error!(error = %e, "Error persisting poll cursor");
            }
        }

        Ok(())
    }
}
