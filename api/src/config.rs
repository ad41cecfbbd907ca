use config::Config;
use config::shared::{
    FeedConfig, PgConnectionConfig, RedisConfig, SentryConfig, SheetsConfig, SyncConfig,
    ValidationError,
};
use serde::Deserialize;

/// Complete configuration of the feed sync service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// HTTP server settings.
    pub application: ApplicationSettings,
    /// Catalog database the products are read from.
    pub database: PgConnectionConfig,
    /// Spreadsheet the feed is written to.
    pub sheets: SheetsConfig,
    /// Redis instance holding the sync lock and job records.
    pub redis: RedisConfig,
    /// Merchant profile written into every feed row.
    #[serde(default)]
    pub feed: FeedConfig,
    /// Recurring sync timing, lock and job record settings.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Optional Sentry configuration for error tracking.
    pub sentry: Option<SentryConfig>,
}

impl ApiConfig {
    /// Checks every section, returning the first invalid setting.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.sheets.validate()?;
        self.feed.validate()?;
        self.sync.validate()?;

        Ok(())
    }
}

impl Config for ApiConfig {}

/// HTTP server bind address.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    /// Host the server binds to.
    pub host: String,
    /// Port the server listens on. `0` picks a free port.
    pub port: u16,
}
