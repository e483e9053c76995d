//! Monitor configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level configuration, loaded once at startup.
///
/// Missing required keys fail the load; the process exits before the
/// polling loop ever starts.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Home Assistant connection settings.
    pub home_assistant: HomeAssistantConfig,

    /// Google Sheets connection settings.
    pub google: GoogleConfig,

    /// Seconds to sleep between poll cycles.
    #[serde(default = "default_polling_interval")]
    pub polling_interval: u64,

    /// Cap in seconds for the error backoff.
    #[serde(default = "default_error_backoff_max")]
    pub error_backoff_max: u64,

    /// Path of the persisted poll cursor.
    #[serde(default = "default_cursor_file")]
    pub cursor_file: PathBuf,
}

/// Home Assistant connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HomeAssistantConfig {
    /// Base URL, e.g. `http://homeassistant.local:8123`.
    pub url: String,

    /// Long-lived access token.
    pub token: String,

    /// Light name to entity id mapping.
    #[serde(default)]
    pub lights: HashMap<String, String>,
}

/// Google Sheets connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    /// Path to the service account credentials JSON file.
    pub credentials_file: PathBuf,

    /// Spreadsheet holding the command sheet.
    pub spreadsheet_id: String,

    /// Sheet (tab) name within the spreadsheet.
    pub sheet_name: String,
}

fn default_polling_interval() -> u64 {
    5
}

fn default_error_backoff_max() -> u64 {
    60
}

fn default_cursor_file() -> PathBuf {
    PathBuf::from("cursor.json")
}

impl MonitorConfig {
    /// Load the configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: MonitorConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Sleep between successful cycles.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval)
    }

    /// Cap for the sleep after failed cycles.
    pub fn error_backoff_cap(&self) -> Duration {
        Duration::from_secs(self.error_backoff_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
home_assistant:
  url: http://homeassistant.local:8123
  token: secret-token
  lights:
    stage_left: light.stage_left
    stage_right: light.stage_right
google:
  credentials_file: credentials.json
  spreadsheet_id: 1AbCdEf
  sheet_name: Commands
polling_interval: 10
error_backoff_max: 120
cursor_file: /var/lib/stagelight/cursor.json
"#;

    #[test]
    fn test_full_config() {
        let config: MonitorConfig = serde_yaml::from_str(FULL_CONFIG).unwrap();
        assert_eq!(config.home_assistant.url, "http://homeassistant.local:8123");
        assert_eq!(
            config.home_assistant.lights.get("stage_right").unwrap(),
            "light.stage_right"
        );
        assert_eq!(config.google.sheet_name, "Commands");
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.error_backoff_cap(), Duration::from_secs(120));
    }

    #[test]
    fn test_defaults() {
        let config: MonitorConfig = serde_yaml::from_str(
            r#"
home_assistant:
  url: http://homeassistant.local:8123
  token: secret-token
google:
  credentials_file: credentials.json
  spreadsheet_id: 1AbCdEf
  sheet_name: Commands
"#,
        )
        .unwrap();
        assert_eq!(config.polling_interval, 5);
        assert_eq!(config.error_backoff_max, 60);
        assert_eq!(config.cursor_file, PathBuf::from("cursor.json"));
        assert!(config.home_assistant.lights.is_empty());
    }

    #[test]
    fn test_missing_required_key_fails() {
        let result: Result<MonitorConfig, _> = serde_yaml::from_str(
            r#"
home_assistant:
  url: http://homeassistant.local:8123
google:
  credentials_file: credentials.json
  spreadsheet_id: 1AbCdEf
  sheet_name: Commands
"#,
        );
        assert!(result.is_err());
    }
}
