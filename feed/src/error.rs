//! Error types and result definitions for feed synchronisation.
//!
//! [`FeedError`] carries an [`ErrorKind`] classification, a static description,
//! optional dynamic detail and source, plus the call site and backtrace where it
//! was created. Use [`crate::feed_error!`] and [`crate::bail!`] to build one.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Result type for fallible feed operations.
pub type FeedResult<T> = Result<T, FeedError>;

#[derive(Debug, Clone)]
struct ErrorPayload {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

/// Error raised by any stage of a feed synchronisation.
#[derive(Debug, Clone)]
pub struct FeedError {
    payload: Box<ErrorPayload>,
}

/// Failure categories, grouped by the collaborator that failed.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // Catalog database
    SourceConnectionFailed,
    SourceQueryFailed,

    // Feed sheet
    DestinationConnectionFailed,
    DestinationQueryFailed,
    DestinationSchemaError,

    // Lock and job store
    StoreConnectionFailed,
    StoreQueryFailed,

    // Data and workflow
    InvalidData,
    InvalidState,

    ConfigError,
    AuthenticationError,

    SerializationError,
    DeserializationError,
    IoError,

    Unknown,
}

impl FeedError {
    pub fn kind(&self) -> ErrorKind {
        self.payload.kind
    }

    /// Returns the static description.
    pub fn description(&self) -> &str {
        &self.payload.description
    }

    /// Returns the dynamic detail, if any.
    pub fn detail(&self) -> Option<&str> {
        self.payload.detail.as_deref()
    }

    /// Returns `"description: detail"`, or only the description without detail.
    ///
    /// This is the form recorded in failed job records.
    pub fn message(&self) -> String {
        match self.detail() {
            Some(detail) if !detail.trim().is_empty() => {
                format!("{}: {}", self.payload.description, detail)
            }
            _ => self.payload.description.to_string(),
        }
    }

    pub fn backtrace(&self) -> &Backtrace {
        self.payload.backtrace.as_ref()
    }

    /// Returns the call site where this error was created.
    pub fn location(&self) -> &'static Location<'static> {
        self.payload.location
    }

    /// Attaches the originating error, exposed through [`error::Error::source`].
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        self.payload.source = Some(Arc::new(source));
        self
    }

    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        FeedError {
            payload: Box::new(ErrorPayload {
                kind,
                description,
                detail,
                source,
                location: Location::caller(),
                backtrace: Arc::new(Backtrace::capture()),
            }),
        }
    }

    #[track_caller]
    fn wrap<E>(kind: ErrorKind, description: &'static str, err: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        let detail = err.to_string();
        FeedError::from_components(
            kind,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

impl PartialEq for FeedError {
    fn eq(&self, other: &FeedError) -> bool {
        self.kind() == other.kind() && self.payload.description == other.payload.description
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = &self.payload;
        write!(
            f,
            "[{:?}] {} @ {}:{}:{}",
            payload.kind,
            payload.description,
            payload.location.file(),
            payload.location.line(),
            payload.location.column()
        )?;

        if let Some(detail) = payload.detail.as_deref() {
            if detail.trim().is_empty() {
                write!(f, "\n  Detail: <empty>")?;
            } else {
                write!(f, "\n  Detail:")?;
                for line in detail.lines() {
                    write!(f, "\n    {line}")?;
                }
            }
        }

        let backtrace = payload.backtrace.to_string();
        if !backtrace.trim().is_empty() {
            write!(f, "\n  Backtrace:")?;
            for line in backtrace.lines() {
                write!(f, "\n    {line}")?;
            }
        }

        Ok(())
    }
}

impl error::Error for FeedError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.payload
            .source
            .as_ref()
            .map(|source| source as &(dyn error::Error + 'static))
    }
}

impl From<(ErrorKind, &'static str)> for FeedError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> FeedError {
        FeedError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

impl<D> From<(ErrorKind, &'static str, D)> for FeedError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> FeedError {
        FeedError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

impl From<std::io::Error> for FeedError {
    #[track_caller]
    fn from(err: std::io::Error) -> FeedError {
        FeedError::wrap(ErrorKind::IoError, "I/O operation failed", err)
    }
}

impl From<serde_json::Error> for FeedError {
    #[track_caller]
    fn from(err: serde_json::Error) -> FeedError {
        let (kind, description) = match err.classify() {
            serde_json::error::Category::Io => (ErrorKind::IoError, "JSON I/O operation failed"),
            serde_json::error::Category::Syntax
            | serde_json::error::Category::Data
            | serde_json::error::Category::Eof => (
                ErrorKind::DeserializationError,
                "JSON deserialization failed",
            ),
        };

        FeedError::wrap(kind, description, err)
    }
}

/// Catalog database failures.
impl From<sqlx::Error> for FeedError {
    #[track_caller]
    fn from(err: sqlx::Error) -> FeedError {
        let kind = match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolClosed
            | sqlx::Error::PoolTimedOut => ErrorKind::SourceConnectionFailed,
            _ => ErrorKind::SourceQueryFailed,
        };

        FeedError::wrap(kind, "Catalog query failed", err)
    }
}

/// Sheets API transport failures.
impl From<reqwest::Error> for FeedError {
    #[track_caller]
    fn from(err: reqwest::Error) -> FeedError {
        let (kind, description) = match err.status().map(|status| status.as_u16()) {
            Some(401) | Some(403) => (
                ErrorKind::AuthenticationError,
                "Sheets API rejected the credentials",
            ),
            _ if err.is_connect() || err.is_timeout() => (
                ErrorKind::DestinationConnectionFailed,
                "Sheets API is unreachable",
            ),
            _ if err.is_decode() => (
                ErrorKind::DeserializationError,
                "Sheets API response could not be decoded",
            ),
            _ => (ErrorKind::DestinationQueryFailed, "Sheets API request failed"),
        };

        FeedError::wrap(kind, description, err)
    }
}

impl From<base64::DecodeError> for FeedError {
    #[track_caller]
    fn from(err: base64::DecodeError) -> FeedError {
        FeedError::wrap(
            ErrorKind::ConfigError,
            "Service account key is not valid base64",
            err,
        )
    }
}

impl From<gcp_auth::Error> for FeedError {
    #[track_caller]
    fn from(err: gcp_auth::Error) -> FeedError {
        FeedError::wrap(
            ErrorKind::AuthenticationError,
            "Google authentication failed",
            err,
        )
    }
}

/// Lock and job store failures.
impl From<fred::error::Error> for FeedError {
    #[track_caller]
    fn from(err: fred::error::Error) -> FeedError {
        use fred::error::ErrorKind as RedisErrorKind;

        let (kind, description) = match err.kind() {
            RedisErrorKind::IO
            | RedisErrorKind::Timeout
            | RedisErrorKind::Canceled
            | RedisErrorKind::Tls => (ErrorKind::StoreConnectionFailed, "Redis is unreachable"),
            RedisErrorKind::Auth => (
                ErrorKind::AuthenticationError,
                "Redis rejected the credentials",
            ),
            _ => (ErrorKind::StoreQueryFailed, "Redis command failed"),
        };

        FeedError::wrap(kind, description, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bail, feed_error};

    #[test]
    fn message_joins_description_and_detail() {
        let err = feed_error!(
            ErrorKind::DestinationSchemaError,
            "Header row is empty",
            "sheet `Feed` has no headers"
        );

        assert_eq!(
            err.message(),
            "Header row is empty: sheet `Feed` has no headers"
        );
        assert_eq!(err.detail(), Some("sheet `Feed` has no headers"));
    }

    #[test]
    fn message_without_detail_is_the_description() {
        let err = feed_error!(ErrorKind::InvalidState, "Job not found");

        assert_eq!(err.message(), "Job not found");
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn location_points_at_the_caller() {
        let line = line!() + 1;
        let err = feed_error!(ErrorKind::Unknown, "boom");

        assert_eq!(err.location().line(), line);
        assert!(err.location().file().ends_with("error.rs"));
    }

    #[test]
    fn display_starts_with_kind_and_description() {
        let err = feed_error!(ErrorKind::InvalidData, "Bad price", detail = "NaN".to_string());

        let rendered = err.to_string();

        assert!(rendered.starts_with("[InvalidData] Bad price @ "));
        assert!(rendered.contains("Detail:\n    NaN"));
    }

    #[test]
    fn json_syntax_errors_are_deserialization_errors() {
        let err: FeedError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();

        assert_eq!(err.kind(), ErrorKind::DeserializationError);
        assert!(error::Error::source(&err).is_some());
    }

    #[test]
    fn bail_returns_early() {
        fn check(value: i32) -> FeedResult<i32> {
            if value < 0 {
                bail!(ErrorKind::InvalidData, "Negative value", value);
            }
            Ok(value)
        }

        assert_eq!(check(1).unwrap(), 1);
        assert_eq!(check(-1).unwrap_err().message(), "Negative value: -1");
    }

    #[test]
    fn equality_ignores_detail_and_location() {
        let a = feed_error!(ErrorKind::StoreQueryFailed, "Redis command failed", "a");
        let b = feed_error!(ErrorKind::StoreQueryFailed, "Redis command failed", "b");

        assert_eq!(a, b);
    }
}
