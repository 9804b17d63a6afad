//! Error types for the contest source and the calendar sink.
//!
//! Every failure crossing the crate boundary is a [`ProviderError`]: a code
//! that callers can match on, a human-readable message, the provider that
//! raised it and an optional underlying cause.

use std::fmt;
use thiserror::Error;

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Connection failed, timed out, DNS or TLS error.
    NetworkError,
    /// The contest source answered but reported a failure.
    SourceUnavailable,
    /// The response body could not be understood.
    InvalidResponse,
    /// The authorization flow failed or was cancelled.
    AuthenticationFailed,
    /// A calendar write was attempted without a session.
    NotAuthenticated,
    /// The calendar API rejected an event insertion.
    CalendarWriteFailed,
    /// Missing or invalid configuration.
    ConfigurationError,
    /// Reading or writing persisted state failed.
    StorageError,
    /// Unexpected internal state.
    InternalError,
}

impl ProviderErrorCode {
    /// Returns the wire name of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::SourceUnavailable => "source_unavailable",
            Self::InvalidResponse => "invalid_response",
            Self::AuthenticationFailed => "authentication_failed",
            Self::NotAuthenticated => "not_authenticated",
            Self::CalendarWriteFailed => "calendar_write_failed",
            Self::ConfigurationError => "configuration_error",
            Self::StorageError => "storage_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised while talking to a contest source or a calendar.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// e.g. `"codeforces"`, `"google"`.
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::SourceUnavailable, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationFailed, message)
    }

    pub fn not_authenticated(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotAuthenticated, message)
    }

    pub fn calendar_write(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::CalendarWriteFailed, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::StorageError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InternalError, message)
    }

    /// Maps a transport-level `reqwest` failure to a network error.
    pub fn from_transport(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timeout".to_string()
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            format!("request failed: {}", err)
        };
        Self::network(message).with_source(err)
    }

    /// Sets the provider name for this error.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Attaches the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_wire_names() {
        assert_eq!(ProviderErrorCode::NetworkError.as_str(), "network_error");
        assert_eq!(
            ProviderErrorCode::SourceUnavailable.as_str(),
            "source_unavailable"
        );
        assert_eq!(
            ProviderErrorCode::CalendarWriteFailed.to_string(),
            "calendar_write_failed"
        );
    }

    #[test]
    fn display_includes_provider_and_code() {
        let err = ProviderError::source_unavailable("Call limit exceeded").with_provider("codeforces");
        assert_eq!(
            err.to_string(),
            "[codeforces] source_unavailable: Call limit exceeded"
        );

        let err = ProviderError::not_authenticated("no session");
        assert_eq!(err.to_string(), "not_authenticated: no session");
        assert!(err.provider().is_none());
    }

    #[test]
    fn source_is_chained() {
        use std::error::Error;
        let io_err = std::io::Error::other("disk full");
        let err = ProviderError::storage("failed to write contests.json").with_source(io_err);
        assert_eq!(err.code(), ProviderErrorCode::StorageError);
        assert_eq!(err.source().map(|s| s.to_string()), Some("disk full".into()));
    }
}
