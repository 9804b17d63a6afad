//! Terminal and JSON output.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use contestcal_core::{
    ContestRecord, TimeStatus, format_duration, format_start, format_time_until,
};
use contestcal_providers::google::CreatedEvent;

const NO_CONTESTS: &str = "No upcoming contests.";

/// Renders the contest list as an aligned table.
pub fn contests_table(
    contests: &[ContestRecord],
    fetched_at: DateTime<Utc>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> String {
    if contests.is_empty() {
        return NO_CONTESTS.to_string();
    }

    let rows: Vec<[String; 5]> = contests
        .iter()
        .map(|c| {
            [
                c.id().to_string(),
                c.name().to_string(),
                format_start(c.start(), tz),
                format_duration(c.duration_seconds()),
                status_label(c, now),
            ]
        })
        .collect();

    let header = ["ID", "NAME", "START", "LENGTH", "STARTS IN"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &header.map(String::from), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out.push_str(&format!(
        "\n{} contests, times in {}, fetched {} ago",
        contests.len(),
        tz.name(),
        format_age(fetched_at, now)
    ));
    out
}

fn status_label(contest: &ContestRecord, now: DateTime<Utc>) -> String {
    let until = format_time_until(contest.start(), now);
    match TimeStatus::classify(contest.start(), now) {
        TimeStatus::Live => "LIVE".to_string(),
        TimeStatus::Soon => format!("{} (soon)", until),
        TimeStatus::Upcoming => until,
    }
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn format_age(fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - fetched_at).num_seconds().max(0);
    if secs < 60 {
        format!("{}s", secs)
    } else {
        format!("{}m", secs / 60)
    }
}

/// JSON shape of `contestcal list --json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestListJson<'a> {
    pub contests: &'a [ContestRecord],
    pub last_fetch: DateTime<Utc>,
    pub timezone: &'a str,
}

pub fn contests_json(
    contests: &[ContestRecord],
    fetched_at: DateTime<Utc>,
    tz: &Tz,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ContestListJson {
        contests,
        last_fetch: fetched_at,
        timezone: tz.name(),
    })
}

/// One-line confirmation for a created event.
pub fn event_created(contest: &ContestRecord, event: &CreatedEvent) -> String {
    match event.html_link {
        Some(ref link) => format!("Added \"{}\" to Google Calendar: {}", contest.name(), link),
        None => format!(
            "Added \"{}\" to Google Calendar (event {})",
            contest.name(),
            event.id
        ),
    }
}
