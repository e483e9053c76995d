//! Home Assistant control surface.

mod client;
mod dispatcher;

pub use client::HubClient;
pub use dispatcher::CommandDispatcher;
