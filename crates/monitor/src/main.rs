//! Stagelight monitor binary.
//!
//! Watches a Google Sheet for light commands and relays them to a local
//! Home Assistant instance.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use monitor::{Monitor, MonitorConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,monitor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config_path =
        std::env::var("STAGELIGHT_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = MonitorConfig::load(&config_path)?;
    tracing::info!(
        config = %config_path,
        hub_url = %config.home_assistant.url,
        spreadsheet_id = %config.google.spreadsheet_id,
        "Configuration loaded"
    );

    let mut monitor = Monitor::new(config).await?;

    // Handle shutdown signals
    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
        tracing::info!("Shutdown signal received");
    };

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Monitor error");
                return Err(e);
            }
        }
        _ = shutdown => {
            tracing::info!("Shutting down monitor");
        }
    }

    tracing::info!("Monitor stopped");
    Ok(())
}
