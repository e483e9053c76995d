//! Stagelight monitor.
//!
//! Watches a Google Sheet for light-control commands and relays them to a
//! local Home Assistant instance, so the instance never has to be exposed
//! to the internet.
//!
//! This crate provides:
//! - Google Sheets client and command poller
//! - Home Assistant HTTP client and command dispatcher
//! - Typed command parsing and the polling loop

pub mod command;
pub mod config;
pub mod cursor;
pub mod error;
pub mod hub;
pub mod monitor;
pub mod sheet;

pub use config::MonitorConfig;
pub use monitor::Monitor;
