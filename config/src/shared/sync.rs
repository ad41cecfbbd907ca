//! Timing and key layout of feed synchronisation runs.

use serde::Deserialize;

use crate::shared::ValidationError;

/// Settings for the recurring sync, the sync lock and job records.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Minutes between two scheduled syncs. The first one runs one interval after startup.
    ///
    /// Default: 300
    #[serde(default = "default_interval_mins")]
    pub interval_mins: u64,

    /// Seconds after which an unreleased sync lock expires.
    ///
    /// Default: 300
    #[serde(default = "default_lock_ttl_secs")]
    pub lock_ttl_secs: u64,

    /// Seconds a job record stays readable after creation.
    ///
    /// Default: 21600 (6 hours)
    #[serde(default = "default_job_ttl_secs")]
    pub job_ttl_secs: u64,

    /// Key of the sync lock.
    #[serde(default = "default_lock_key")]
    pub lock_key: String,

    /// Prefix of job record keys, followed by `:{job_id}`.
    #[serde(default = "default_job_key_prefix")]
    pub job_key_prefix: String,
}

impl SyncConfig {
    pub const DEFAULT_INTERVAL_MINS: u64 = 300;

    pub const DEFAULT_LOCK_TTL_SECS: u64 = 300;

    pub const DEFAULT_JOB_TTL_SECS: u64 = 6 * 60 * 60;

    pub const DEFAULT_LOCK_KEY: &'static str = "merchant_feed_sync_lock";

    pub const DEFAULT_JOB_KEY_PREFIX: &'static str = "merchant_feed_sync_job";

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_mins == 0 {
            return Err(ValidationError::ZeroField("sync.interval_mins"));
        }
        if self.lock_ttl_secs == 0 {
            return Err(ValidationError::ZeroField("sync.lock_ttl_secs"));
        }
        if self.job_ttl_secs == 0 {
            return Err(ValidationError::ZeroField("sync.job_ttl_secs"));
        }
        if self.lock_key.is_empty() {
            return Err(ValidationError::EmptyField("sync.lock_key"));
        }
        if self.job_key_prefix.is_empty() {
            return Err(ValidationError::EmptyField("sync.job_key_prefix"));
        }

        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_mins: Self::DEFAULT_INTERVAL_MINS,
            lock_ttl_secs: Self::DEFAULT_LOCK_TTL_SECS,
            job_ttl_secs: Self::DEFAULT_JOB_TTL_SECS,
            lock_key: Self::DEFAULT_LOCK_KEY.to_string(),
            job_key_prefix: Self::DEFAULT_JOB_KEY_PREFIX.to_string(),
        }
    }
}

fn default_interval_mins() -> u64 {
    SyncConfig::DEFAULT_INTERVAL_MINS
}

fn default_lock_ttl_secs() -> u64 {
    SyncConfig::DEFAULT_LOCK_TTL_SECS
}

fn default_job_ttl_secs() -> u64 {
    SyncConfig::DEFAULT_JOB_TTL_SECS
}

fn default_lock_key() -> String {
    SyncConfig::DEFAULT_LOCK_KEY.to_string()
}

fn default_job_key_prefix() -> String {
    SyncConfig::DEFAULT_JOB_KEY_PREFIX.to_string()
}
