//! Client error types.

use std::fmt;

use contestcal_core::{ContestId, TimeError};
use contestcal_providers::ProviderError;
use contestcal_server::{ErrorResponse, ServerError};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Provider setup failed.
    Provider(String),
    /// IO error.
    Io(std::io::Error),
    /// The dispatcher answered with an error.
    Request(ErrorResponse),
    /// No upcoming contest has this ID.
    UnknownContest(ContestId),
    /// Output could not be rendered.
    Render(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Provider(msg) => write!(f, "provider error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Request(err) => write!(f, "{}", err),
            Self::UnknownContest(id) => write!(
                f,
                "contest {} is not among the upcoming contests; run `contestcal list`",
                id
            ),
            Self::Render(msg) => write!(f, "output error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Request(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err.to_string())
    }
}

impl From<ServerError> for ClientError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Io(e) => Self::Io(e),
            ServerError::Config { message } => Self::Config(message),
            other => Self::Request(ErrorResponse::from(&other)),
        }
    }
}

impl From<ErrorResponse> for ClientError {
    fn from(err: ErrorResponse) -> Self {
        Self::Request(err)
    }
}

impl From<TimeError> for ClientError {
    fn from(err: TimeError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contestcal_server::ErrorCode;

    #[test]
    fn request_errors_show_description() {
        let err = ClientError::from(ErrorResponse::new(
            ErrorCode::NotAuthenticated,
            "[google] not_authenticated: not authenticated with Google Calendar",
        ));
        assert!(err.to_string().starts_with("Not signed in to Google Calendar: "));
    }

    #[test]
    fn unknown_timezone_is_config_error() {
        let err = ClientError::from(TimeError::UnknownTimezone("Mars/Olympus".into()));
        assert!(matches!(err, ClientError::Config(_)));
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    #[test]
    fn server_io_errors_stay_io() {
        let err = ClientError::from(ServerError::Io(std::io::Error::other("disk full")));
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[test]
    fn server_config_errors_stay_config() {
        let err = ClientError::from(ServerError::config("scheduler interval must be positive"));
        assert!(matches!(err, ClientError::Config(ref m) if m.contains("interval")));
    }
}
