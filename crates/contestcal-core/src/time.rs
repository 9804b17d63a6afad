//! Time helpers for displaying contests.
//!
//! Contest instants are stored in UTC; these helpers render them in a
//! user-selected IANA timezone and describe how far away they are.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Contests starting sooner than this are flagged as [`TimeStatus::Soon`].
const SOON_THRESHOLD_SECS: i64 = 3600;

/// Errors from timezone handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    /// The name is not a known IANA timezone.
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// How close a contest is to starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeStatus {
    /// The contest has already started.
    Live,
    /// The contest starts within the hour.
    Soon,
    /// The contest starts later.
    Upcoming,
}

impl TimeStatus {
    /// Classifies a start instant relative to `now`.
    pub fn classify(start: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let secs = (start - now).num_seconds();
        if secs < 0 {
            Self::Live
        } else if secs < SOON_THRESHOLD_SECS {
            Self::Soon
        } else {
            Self::Upcoming
        }
    }
}

/// Parses an IANA timezone name (e.g. `Europe/Paris`).
pub fn parse_timezone(name: &str) -> Result<Tz, TimeError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| TimeError::UnknownTimezone(name.to_string()))
}

/// Returns the timezone named by the `TZ` environment variable, or UTC.
pub fn local_timezone() -> Tz {
    std::env::var("TZ")
        .ok()
        .and_then(|name| parse_timezone(&name).ok())
        .unwrap_or(Tz::UTC)
}

/// Formats a duration given in seconds as `"2h 30m"`.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
}

/// Describes the time left before `start`.
///
/// Returns `"Started"` once `start` has passed, `"{d}d {h}h"` when at least a
/// day remains, `"{h}h {m}m"` when at least an hour remains and `"{m}m"`
/// otherwise.
pub fn format_time_until(start: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (start - now).num_seconds();
    if secs < 0 {
        return "Started".to_string();
    }

    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Formats a start instant in `tz` as `"Fri, Jul 05, 11:55"`.
pub fn format_start(start: DateTime<Utc>, tz: &Tz) -> String {
    tz.from_utc_datetime(&start.naive_utc())
        .format("%a, %b %d, %H:%M")
        .to_string()
}
