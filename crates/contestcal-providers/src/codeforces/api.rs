//! Codeforces API wire types and normalization.

use contestcal_core::{ContestId, ContestRecord};
use serde::Deserialize;
use tracing::warn;

use crate::error::{ProviderError, ProviderResult};

/// Phase of a contest that has not started yet.
pub const PHASE_BEFORE: &str = "BEFORE";

/// Envelope returned by every Codeforces API method.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub result: Option<Vec<ApiContest>>,
}

/// A contest as listed by `contest.list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContest {
    pub id: ContestId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub phase: String,
    pub duration_seconds: i64,
    #[serde(default)]
    pub start_time_seconds: Option<i64>,
}

/// Converts a `contest.list` response into at most `limit` upcoming contests.
///
/// The window is the first `limit` `BEFORE` contests in API order. Entries
/// in that window without a start time, or whose end is not a valid
/// instant, are skipped, so fewer than `limit` records may come back.
pub fn normalize_contests(response: ApiResponse, limit: usize) -> ProviderResult<Vec<ContestRecord>> {
    if response.status != "OK" {
        let reason = response
            .comment
            .unwrap_or_else(|| format!("status {}", response.status));
        return Err(ProviderError::source_unavailable(reason));
    }

    let contests = response
        .result
        .ok_or_else(|| ProviderError::invalid_response("missing result in OK response"))?;

    let upcoming = contests
        .into_iter()
        .filter(|c| c.phase == PHASE_BEFORE)
        .take(limit)
        .filter_map(to_record)
        .collect();

    Ok(upcoming)
}

fn to_record(contest: ApiContest) -> Option<ContestRecord> {
    let Some(start) = contest.start_time_seconds else {
        warn!(contest_id = contest.id, "skipping upcoming contest without start time");
        return None;
    };
    let record = ContestRecord::new(
        contest.id,
        contest.name,
        start,
        contest.duration_seconds,
        contest.kind,
    );
    if record.end().is_none() {
        warn!(
            contest_id = record.id(),
            duration_seconds = record.duration_seconds(),
            "skipping upcoming contest with out-of-range duration"
        );
        return None;
    }
    Some(record)
}
