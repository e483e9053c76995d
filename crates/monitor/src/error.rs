//! Error types for the monitor.

use thiserror::Error;

/// Errors talking to the Google Sheets API.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Transport-level failure.
    #[error("Sheets request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Could not obtain an access token.
    #[error("Sheets auth failed: {0}")]
    Auth(String),

    /// Non-success response from the API.
    #[error("Sheets API error (status {status}): {body}")]
    Api { status: u16, body: String },
}

impl From<gcp_auth::Error> for SheetError {
    fn from(e: gcp_auth::Error) -> Self {
        SheetError::Auth(e.to_string())
    }
}

/// Errors talking to the Home Assistant API.
#[derive(Debug, Error)]
pub enum HubError {
    /// Transport-level failure.
    #[error("Home Assistant request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success response from the API.
    #[error("Home Assistant error (status {status}): {body}")]
    Status { status: u16, body: String },
}

/// A row that cannot be turned into a dispatchable command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// Action name outside the supported set.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Brightness parameter is not a number.
    #[error("Brightness is not a number: {0}")]
    InvalidBrightness(String),

    /// Color parameter is not a 6-digit hex string.
    #[error("Invalid color {0:?}: expected 6 hex digits")]
    InvalidColor(String),

    /// Scene command without a scene name.
    #[error("Scene command without a scene name")]
    MissingScene,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CommandError::UnknownAction("strobe".to_string());
        assert_eq!(err.to_string(), "Unknown action: strobe");

        let err = SheetError::Api {
            status: 403,
            body: "forbidden".to_string(),
        };
        assert_eq!(err.to_string(), "Sheets API error (status 403): forbidden");
    }
}
