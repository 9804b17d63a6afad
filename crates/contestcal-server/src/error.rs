//! Server error types.

use std::io;
use std::sync::Arc;

use contestcal_providers::ProviderError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A cache refresh failed. Shared by every caller awaiting that refresh.
    #[error("fetch failed: {0}")]
    FetchFailed(Arc<ProviderError>),

    /// A provider call failed outside of a cache refresh.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// IO error (state directory, etc.).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
