//! Google Sheets command source.

mod auth;
mod client;
mod poller;

pub use auth::{ServiceAccountTokenSource, TokenSource};
pub use client::SheetsClient;
pub use poller::{CommandPoller, PollOutcome};

#[cfg(test)]
pub(crate) use auth::StaticTokenSource;
