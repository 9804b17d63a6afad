//! Request and response types for the dispatcher.

use chrono::{DateTime, Utc};
use contestcal_core::ContestRecord;
use contestcal_providers::google::CreatedEvent;
use contestcal_providers::{ProviderError, ProviderErrorCode};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

/// Requests a front end can send to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Upcoming contests, from cache when fresh.
    FetchContests,

    /// Drop the cache and fetch again.
    Refresh,

    /// Run the authorization flow.
    Authenticate,

    /// Validate the stored session.
    CheckAuthStatus,

    /// Create a calendar event for a contest.
    AddToCalendar { contest: ContestRecord },

    Logout,
}

impl Request {
    pub fn add_to_calendar(contest: ContestRecord) -> Self {
        Self::AddToCalendar { contest }
    }
}

/// Responses produced by the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Upcoming contests and when they were fetched.
    Contests {
        contests: Vec<ContestRecord>,
        fetched_at: DateTime<Utc>,
    },

    AuthStatus { authenticated: bool },

    /// The event the calendar created.
    EventCreated { event: CreatedEvent },

    /// Generic success response.
    Ok,

    /// Error response.
    Error {
        #[serde(flatten)]
        error: ErrorResponse,
    },
}

impl Response {
    pub fn contests(contests: Vec<ContestRecord>, fetched_at: DateTime<Utc>) -> Self {
        Self::Contests {
            contests,
            fetched_at,
        }
    }

    pub fn auth_status(authenticated: bool) -> Self {
        Self::AuthStatus { authenticated }
    }

    /// Creates an Error response.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            error: ErrorResponse::new(code, message),
        }
    }

    pub fn from_error(error: ErrorResponse) -> Self {
        Self::Error { error }
    }

    /// Returns true unless this is an error response.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }

    /// Returns the error if this is an error response.
    pub fn as_error(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Error { error } => Some(error),
            _ => None,
        }
    }
}

/// Error codes carried by error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NetworkError,
    SourceUnavailable,
    InvalidResponse,
    AuthenticationFailed,
    NotAuthenticated,
    CalendarWriteFailed,
    /// The contest cache could not be refreshed.
    FetchFailed,
    InternalError,
}

impl ErrorCode {
    /// Returns a human-readable description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NetworkError => "Could not reach the remote service",
            Self::SourceUnavailable => "The contest source reported a failure",
            Self::InvalidResponse => "The remote service sent an unexpected response",
            Self::AuthenticationFailed => "Authentication failed",
            Self::NotAuthenticated => "Not signed in to Google Calendar",
            Self::CalendarWriteFailed => "Google Calendar rejected the event",
            Self::FetchFailed => "Could not fetch contests",
            Self::InternalError => "An internal error occurred",
        }
    }
}

impl From<ProviderErrorCode> for ErrorCode {
    fn from(code: ProviderErrorCode) -> Self {
        match code {
            ProviderErrorCode::NetworkError => Self::NetworkError,
            ProviderErrorCode::SourceUnavailable => Self::SourceUnavailable,
            ProviderErrorCode::InvalidResponse => Self::InvalidResponse,
            ProviderErrorCode::AuthenticationFailed => Self::AuthenticationFailed,
            ProviderErrorCode::NotAuthenticated => Self::NotAuthenticated,
            ProviderErrorCode::CalendarWriteFailed => Self::CalendarWriteFailed,
            ProviderErrorCode::ConfigurationError
            | ProviderErrorCode::StorageError
            | ProviderErrorCode::InternalError => Self::InternalError,
        }
    }
}

/// Error response details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<&ProviderError> for ErrorResponse {
    fn from(err: &ProviderError) -> Self {
        Self::new(err.code().into(), err.to_string())
    }
}

impl From<&ServerError> for ErrorResponse {
    fn from(err: &ServerError) -> Self {
        match err {
            // The message keeps the underlying cause; the code says the cache is affected.
            ServerError::FetchFailed(e) => Self::new(ErrorCode::FetchFailed, e.to_string()),
            ServerError::Provider(e) => e.into(),
            other => Self::internal(other.to_string()),
        }
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl std::error::Error for ErrorResponse {}
