use secrecy::SecretString;
use serde::Deserialize;

/// Sentry error reporting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SentryConfig {
    /// Sentry DSN errors and traces are reported to.
    pub dsn: SecretString,
}
