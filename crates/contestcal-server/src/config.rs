//! Server configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::DEFAULT_FRESHNESS;
use crate::error::ServerResult;
use crate::scheduler::SchedulerConfig;

/// File name of the persisted contest cache.
pub const CONTESTS_FILE: &str = "contests.json";

/// File name of the persisted auth session.
pub const SESSION_FILE: &str = "session.json";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory holding `contests.json` and `session.json`.
    pub state_dir: PathBuf,

    /// Maximum age of served contest data.
    pub freshness: Duration,

    /// Background refresh timing.
    pub scheduler: SchedulerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            freshness: DEFAULT_FRESHNESS,
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            ..Default::default()
        }
    }

    /// Builder: set the freshness window.
    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    /// Builder: set the scheduler timing.
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn contests_path(&self) -> PathBuf {
        self.state_dir.join(CONTESTS_FILE)
    }

    pub fn session_path(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE)
    }

    /// Creates the state directory if needed.
    pub fn ensure_state_dir(&self) -> ServerResult<&Path> {
        std::fs::create_dir_all(&self.state_dir)?;
        Ok(&self.state_dir)
    }
}

/// Returns the default state directory.
///
/// Uses `$XDG_STATE_HOME/contestcal` if set, otherwise
/// `~/.local/state/contestcal`, falling back to the current directory.
pub fn default_state_dir() -> PathBuf {
    if let Some(state_home) = std::env::var_os("XDG_STATE_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(state_home).join("contestcal");
    }
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".local").join("state"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("contestcal")
}
