//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use contestcal_core::ContestId;

use crate::flow::BrowserFlow;

/// contestcal - Upcoming Codeforces contests, one command away from your calendar
#[derive(Debug, Parser)]
#[command(name = "contestcal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CONTESTCAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// IANA timezone used for display and calendar events
    #[arg(long, env = "CONTESTCAL_TIMEZONE")]
    pub timezone: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List upcoming contests (the default)
    List {
        /// Bypass the cache and fetch fresh data
        #[arg(long, short)]
        refresh: bool,
    },

    /// Drop the cached contests and fetch them again
    Refresh,

    /// Add a contest to Google Calendar
    Add {
        /// Contest ID as shown by `contestcal list`
        id: ContestId,
    },

    /// Google Calendar authentication
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Keep the contest cache warm in the foreground
    Daemon,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

impl Cli {
    /// The authorization flow to use for this invocation.
    pub fn browser_flow(&self) -> BrowserFlow {
        match self.command {
            Some(Command::Auth {
                action: AuthAction::Login {
                    no_browser: true, ..
                },
            }) => BrowserFlow::new().without_browser(),
            _ => BrowserFlow::new(),
        }
    }
}

/// Authentication actions.
#[derive(Debug, Subcommand)]
pub enum AuthAction {
    /// Sign in to Google Calendar
    Login {
        /// Sign in again even if the stored session is valid
        #[arg(long, short)]
        force: bool,

        /// Print the authorization URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Forget the stored session
    Logout,

    /// Check whether the stored session is still accepted
    Status,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
