use secrecy::SecretString;
use serde::Deserialize;

/// Connection settings for the Redis instance holding the sync lock and job records.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<SecretString>,
}
