//! Google Calendar configuration.

use std::time::Duration;

/// Settings for the OAuth implicit flow and the Calendar API.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth 2.0 client ID registered in the Google Cloud Console.
    pub client_id: String,

    /// Redirect URI registered for the client. The browser lands here with
    /// the access token in the URL fragment.
    pub redirect_uri: String,

    /// OAuth scopes to request.
    pub scopes: Vec<String>,

    /// Request timeout for Calendar API calls.
    pub timeout: Duration,

    /// Calendar API root. Overridden in tests.
    pub api_base: String,

    /// Authorization endpoint.
    pub auth_url: String,
}

impl GoogleConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Scope allowing event creation on the user's calendars.
    pub const DEFAULT_SCOPE: &'static str = "https://www.googleapis.com/auth/calendar.events";

    pub const DEFAULT_REDIRECT_URI: &'static str = "http://localhost";

    pub const DEFAULT_API_BASE: &'static str = "https://www.googleapis.com/calendar/v3";

    pub const DEFAULT_AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/auth";

    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: Self::DEFAULT_REDIRECT_URI.to_string(),
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            api_base: Self::DEFAULT_API_BASE.to_string(),
            auth_url: Self::DEFAULT_AUTH_URL.to_string(),
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    /// Checks that the settings can produce a usable authorization URL.
    pub fn validate(&self) -> Result<(), String> {
        if self.client_id.is_empty() {
            return Err("client_id is required".to_string());
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com".to_string());
        }
        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }
        url::Url::parse(&self.redirect_uri)
            .map_err(|e| format!("invalid redirect_uri {:?}: {}", self.redirect_uri, e))?;
        Ok(())
    }
}
