//! Google API authentication.

use std::path::Path;

use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};

use crate::error::SheetError;

/// OAuth scope required to read and write the command sheet.
const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Source of bearer tokens for Sheets API calls.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Return a currently valid access token.
    async fn access_token(&self) -> Result<String, SheetError>;
}

/// Token source backed by a Google service account key file.
///
/// Token refresh and caching are handled by the underlying provider.
pub struct ServiceAccountTokenSource {
    account: CustomServiceAccount,
}

impl ServiceAccountTokenSource {
    /// Load the service account from a credentials JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SheetError> {
        let account = CustomServiceAccount::from_file(path.as_ref())?;
        Ok(Self { account })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, SheetError> {
        let token = self.account.token(&[SPREADSHEETS_SCOPE]).await?;
        Ok(token.as_str().to_string())
    }
}

/// Fixed-token source for tests.
#[cfg(test)]
pub(crate) struct StaticTokenSource(pub &'static str);

#[cfg(test)]
#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String, SheetError> {
        Ok(self.0.to_string())
    }
}
