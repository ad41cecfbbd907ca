use secrecy::SecretString;
use serde::Deserialize;

use crate::shared::ValidationError;

/// Location of the feed spreadsheet and the credentials used to edit it.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    /// Identifier of the spreadsheet, as found in its URL.
    pub spreadsheet_id: String,
    /// Tab holding the feed. Row 1 is the header row.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Base64-encoded Google service account key JSON.
    pub service_account_key: SecretString,
    /// Overrides the Sheets REST endpoint, e.g. for a local emulator.
    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl SheetsConfig {
    pub const DEFAULT_SHEET_NAME: &'static str = "Sheet1";

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("sheets.spreadsheet_id"));
        }
        if self.sheet_name.is_empty() {
            return Err(ValidationError::EmptyField("sheets.sheet_name"));
        }

        Ok(())
    }
}

fn default_sheet_name() -> String {
    SheetsConfig::DEFAULT_SHEET_NAME.to_string()
}
