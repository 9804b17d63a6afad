//! Contest listing and calendar commands.

use chrono::{DateTime, Utc};
use tracing::info;

use contestcal_core::{ContestId, ContestRecord};
use contestcal_server::{Request, Response};

use crate::app::App;
use crate::error::{ClientError, ClientResult};
use crate::render;

/// Print upcoming contests, refetching first when `refresh` is set.
pub async fn list(app: &App, refresh: bool, json: bool) -> ClientResult<()> {
    let request = if refresh {
        Request::Refresh
    } else {
        Request::FetchContests
    };
    let (contests, fetched_at) = fetch(app, request).await?;

    let out = if json {
        render::contests_json(&contests, fetched_at, &app.timezone())?
    } else {
        render::contests_table(&contests, fetched_at, Utc::now(), &app.timezone())
    };
    println!("{}", out);
    Ok(())
}

/// Add the upcoming contest `id` to Google Calendar.
pub async fn add(app: &App, id: ContestId, json: bool) -> ClientResult<()> {
    let (contests, _) = fetch(app, Request::FetchContests).await?;
    let contest = find_contest(contests, id)?;

    let event = match app.request(Request::add_to_calendar(contest.clone())).await? {
        Response::EventCreated { event } => event,
        other => return Err(unexpected(&other)),
    };

    info!(contest_id = id, event_id = %event.id, "contest added to calendar");
    if json {
        println!("{}", serde_json::to_string_pretty(&event)?);
    } else {
        println!("{}", render::event_created(&contest, &event));
    }
    Ok(())
}

async fn fetch(app: &App, request: Request) -> ClientResult<(Vec<ContestRecord>, DateTime<Utc>)> {
    match app.request(request).await? {
        Response::Contests {
            contests,
            fetched_at,
        } => Ok((contests, fetched_at)),
        other => Err(unexpected(&other)),
    }
}

fn find_contest(contests: Vec<ContestRecord>, id: ContestId) -> ClientResult<ContestRecord> {
    contests
        .into_iter()
        .find(|c| c.id() == id)
        .ok_or(ClientError::UnknownContest(id))
}

pub(crate) fn unexpected(response: &Response) -> ClientError {
    ClientError::Render(format!("unexpected response: {:?}", response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_contest_by_id() {
        let contests = vec![
            ContestRecord::new(2119, "Div. 2", 1_720_180_500, 7200, "CF"),
            ContestRecord::new(2120, "Div. 1", 1_720_190_000, 7200, "CF"),
        ];
        assert_eq!(find_contest(contests.clone(), 2120).unwrap().name(), "Div. 1");
        assert!(matches!(
            find_contest(contests, 1),
            Err(ClientError::UnknownContest(1))
        ));
    }
}
