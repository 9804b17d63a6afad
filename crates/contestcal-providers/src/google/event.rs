//! Calendar event payload built from a contest.

use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone};
use chrono_tz::Tz;
use contestcal_core::ContestRecord;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult};

/// Minutes-before-start of the popup reminders attached to each event.
pub const REMINDER_MINUTES: [u32; 2] = [30, 10];

/// Body of an `events.insert` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventPayload {
    pub summary: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub reminders: Reminders,
}

/// A zoned instant: RFC 3339 with offset plus the IANA zone name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

impl EventDateTime {
    fn new(instant: DateTime<Tz>) -> Self {
        Self {
            date_time: instant.to_rfc3339_opts(SecondsFormat::Secs, false),
            time_zone: instant.timezone().name().to_string(),
        }
    }

    /// Parses the instant back, if well-formed.
    pub fn instant(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.date_time).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

impl CalendarEventPayload {
    /// Builds the event for `contest`, rendered in `tz`.
    ///
    /// With `reminders` off the event still disables the calendar's default
    /// reminders but carries no overrides. Fails when the contest end is
    /// not a representable instant.
    pub fn for_contest(contest: &ContestRecord, tz: &Tz, reminders: bool) -> ProviderResult<Self> {
        let end = contest.end().ok_or_else(|| {
            ProviderError::calendar_write(format!(
                "contest {} has an out-of-range duration ({}s)",
                contest.id(),
                contest.duration_seconds()
            ))
        })?;
        let start = tz.from_utc_datetime(&contest.start().naive_utc());
        let end = tz.from_utc_datetime(&end.naive_utc());

        let overrides = if reminders {
            REMINDER_MINUTES
                .iter()
                .map(|&minutes| ReminderOverride {
                    method: "popup".to_string(),
                    minutes,
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            summary: contest.name().to_string(),
            description: describe(contest),
            start: EventDateTime::new(start),
            end: EventDateTime::new(end),
            reminders: Reminders {
                use_default: false,
                overrides,
            },
        })
    }
}

fn describe(contest: &ContestRecord) -> String {
    format!(
        "CodeForces Contest\n\nType: {}\nContest ID: {}\nURL: {}\n\nGood luck with the contest!",
        contest.kind(),
        contest.id(),
        contest.url()
    )
}
