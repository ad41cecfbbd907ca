use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// TLS is enabled but no trusted root certificates are provided.
    #[error("Invalid TLS config: `trusted_root_certs` must be set when `enabled` is true")]
    MissingTrustedRootCerts,
    /// A required string field is empty.
    #[error("`{0}` cannot be empty")]
    EmptyField(&'static str),
    /// A duration or interval field is zero.
    #[error("`{0}` cannot be zero")]
    ZeroField(&'static str),
}
