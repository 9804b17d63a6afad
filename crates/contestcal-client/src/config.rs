//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/contestcal/config.toml` by default. Every section is optional:
//!
//! ```toml
//! state_dir = "/home/me/.local/state/contestcal"
//! timeout_secs = 30
//!
//! [google]
//! client_id = "1234-abc.apps.googleusercontent.com"
//! redirect_uri = "http://localhost"
//! scopes = ["https://www.googleapis.com/auth/calendar.events"]
//!
//! [display]
//! timezone = "Europe/Paris"
//! reminders = true
//!
//! [cache]
//! freshness_secs = 300
//!
//! [daemon]
//! initial_delay_secs = 1800
//! interval_secs = 3600
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use contestcal_core::{local_timezone, parse_timezone};
use contestcal_providers::google::GoogleConfig;
use contestcal_server::{DEFAULT_FRESHNESS, SchedulerConfig, ServerConfig, default_state_dir};

use crate::error::{ClientError, ClientResult};

/// Configuration for the contestcal client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Directory for `contests.json` and `session.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,

    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,

    pub google: GoogleSettings,
    pub display: DisplaySettings,
    pub cache: CacheSettings,
    pub daemon: DaemonSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            state_dir: None,
            timeout_secs: GoogleConfig::DEFAULT_TIMEOUT_SECS,
            google: GoogleSettings::default(),
            display: DisplaySettings::default(),
            cache: CacheSettings::default(),
            daemon: DaemonSettings::default(),
        }
    }
}

/// Google Calendar settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// OAuth client ID from the Google Cloud Console.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// Scopes to request; empty means the calendar events scope.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// IANA timezone name. Defaults to `$TZ`, then UTC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Add popup reminders 30 and 10 minutes before created events.
    pub reminders: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            timezone: None,
            reminders: true,
        }
    }
}

/// Contest cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub freshness_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            freshness_secs: DEFAULT_FRESHNESS.as_secs(),
        }
    }
}

/// Background refresh settings for `contestcal daemon`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonSettings {
    pub initial_delay_secs: u64,
    pub interval_secs: u64,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        let scheduler = SchedulerConfig::default();
        Self {
            initial_delay_secs: scheduler.initial_delay.as_secs(),
            interval_secs: scheduler.interval.as_secs(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> ClientResult<Self> {
        toml::from_str(content)
            .map_err(|e| ClientError::Config(format!("failed to parse config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("contestcal")
            .join("config.toml")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolves the display timezone. `override_name` wins over the file.
    pub fn timezone(&self, override_name: Option<&str>) -> ClientResult<Tz> {
        match override_name.or(self.display.timezone.as_deref()) {
            Some(name) => Ok(parse_timezone(name)?),
            None => Ok(local_timezone()),
        }
    }

    /// Builds the Google provider configuration.
    ///
    /// A missing client ID is accepted here; authentication reports it.
    pub fn google_config(&self) -> GoogleConfig {
        let mut config = GoogleConfig::new(self.google.client_id.clone().unwrap_or_default())
            .with_timeout(self.timeout());
        if let Some(ref redirect_uri) = self.google.redirect_uri {
            config = config.with_redirect_uri(redirect_uri);
        }
        if !self.google.scopes.is_empty() {
            config = config.with_scopes(self.google.scopes.clone());
        }
        config
    }

    /// Builds the cache and scheduler configuration.
    pub fn server_config(&self) -> ServerConfig {
        let state_dir = self.state_dir.clone().unwrap_or_else(default_state_dir);
        ServerConfig::new(state_dir)
            .with_freshness(Duration::from_secs(self.cache.freshness_secs))
            .with_scheduler(SchedulerConfig::new(
                Duration::from_secs(self.daemon.initial_delay_secs),
                Duration::from_secs(self.daemon.interval_secs),
            ))
    }

    /// Checks the settings that would otherwise only fail at use.
    pub fn validate(&self) -> ClientResult<()> {
        self.timezone(None)?;
        if self.timeout_secs == 0 {
            return Err(ClientError::Config("timeout_secs must be positive".into()));
        }
        if self.daemon.interval_secs == 0 {
            return Err(ClientError::Config(
                "[daemon] interval_secs must be positive".into(),
            ));
        }
        if self.google.client_id.is_some() {
            self.google_config()
                .validate()
                .map_err(|e| ClientError::Config(format!("invalid [google] section: {}", e)))?;
        }
        Ok(())
    }
}
