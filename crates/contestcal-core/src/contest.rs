//! Contest types.
//!
//! This module provides the normalized representation of an upcoming
//! competitive-programming contest:
//! - [`ContestRecord`]: an immutable contest as produced by a contest source
//! - [`ContestKind`]: the contest format tag (`CF`, `IOI`, `ICPC`, ...)

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Base URL for contest pages.
pub const CONTEST_URL_BASE: &str = "https://codeforces.com/contest";

/// Identifier of a contest as assigned by the contest source.
pub type ContestId = u64;

/// The scoring format of a contest.
///
/// Unknown tags are preserved verbatim in [`ContestKind::Other`] so that a
/// new format introduced upstream survives a round-trip through the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContestKind {
    /// Classic Codeforces rules.
    Cf,
    /// IOI rules (partial scoring).
    Ioi,
    /// ICPC rules (penalty time).
    Icpc,
    /// Any other tag reported by the source.
    Other(String),
}

impl ContestKind {
    /// Returns the tag as reported by the source.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cf => "CF",
            Self::Ioi => "IOI",
            Self::Icpc => "ICPC",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for ContestKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "CF" => Self::Cf,
            "IOI" => Self::Ioi,
            "ICPC" => Self::Icpc,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for ContestKind {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<ContestKind> for String {
    fn from(kind: ContestKind) -> Self {
        match kind {
            ContestKind::Other(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ContestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized upcoming contest.
///
/// Records are immutable once built; the serialized shape mirrors the
/// contest source (`startTimeSeconds`, `durationSeconds`, `type`) so that a
/// persisted cache reads like the upstream payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestRecord {
    id: ContestId,
    name: String,
    start_time_seconds: i64,
    duration_seconds: i64,
    #[serde(rename = "type")]
    kind: ContestKind,
}

impl ContestRecord {
    /// Creates a new contest record.
    pub fn new(
        id: ContestId,
        name: impl Into<String>,
        start_time_seconds: i64,
        duration_seconds: i64,
        kind: impl Into<ContestKind>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            start_time_seconds,
            duration_seconds,
            kind: kind.into(),
        }
    }

    /// Returns the contest identifier.
    pub fn id(&self) -> ContestId {
        self.id
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the start instant as seconds since the Unix epoch.
    pub fn start_time_seconds(&self) -> i64 {
        self.start_time_seconds
    }

    /// Returns the duration in seconds.
    pub fn duration_seconds(&self) -> i64 {
        self.duration_seconds
    }

    /// Returns the contest kind.
    pub fn kind(&self) -> &ContestKind {
        &self.kind
    }

    /// Returns the start instant.
    ///
    /// Out-of-range timestamps clamp to the Unix epoch.
    pub fn start(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.start_time_seconds, 0).unwrap_or_default()
    }

    /// Returns the contest duration, or `None` if it does not fit a
    /// [`Duration`].
    pub fn duration(&self) -> Option<Duration> {
        Duration::try_seconds(self.duration_seconds)
    }

    /// Returns the end instant (start + duration).
    ///
    /// `None` when the end falls outside the representable date range.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.start().checked_add_signed(self.duration()?)
    }

    /// Returns the contest page URL.
    pub fn url(&self) -> String {
        format!("{}/{}", CONTEST_URL_BASE, self.id)
    }

    /// Returns the time remaining until the contest starts (negative once started).
    pub fn time_until_start(&self, now: DateTime<Utc>) -> Duration {
        self.start() - now
    }

    /// Returns true if the contest has started at `now`.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.start() <= now
    }
}
