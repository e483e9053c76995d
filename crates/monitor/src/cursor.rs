//! Durable poll cursor.
//!
//! The cursor is the absolute sheet row number the poller has read up to.
//! It is persisted after every cycle that advances it, so a restart
//! resumes behind the same row instead of replaying the whole sheet.
//! Rows replayed after a crash mid-cycle are harmless: their status is
//! already terminal and no longer matches the pending filter.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row number of the header row, where a fresh monitor starts.
pub const INITIAL_CURSOR: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CursorState {
    last_processed_row: u32,
    updated_at: DateTime<Utc>,
}

/// File-backed storage for the poll cursor.
#[derive(Debug)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted cursor, or the initial cursor if none exists.
    pub fn load(&self) -> Result<u32> {
        if !self.path.exists() {
            return Ok(INITIAL_CURSOR);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading cursor file {}", self.path.display()))?;
        let state: CursorState = serde_json::from_str(&content)
            .with_context(|| format!("parsing cursor file {}", self.path.display()))?;
        Ok(state.last_processed_row)
    }

    /// Persist the cursor.
    pub fn save(&self, cursor: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let state = CursorState {
            last_processed_row: cursor,
            updated_at: Utc::now(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&state)?)
            .with_context(|| format!("writing cursor file {}", self.path.display()))?;
        Ok(())
    }
}
