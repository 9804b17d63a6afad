//! Writing contests into the user's calendar.

use chrono_tz::Tz;
use contestcal_core::ContestRecord;
use tracing::info;

use super::client::{CreatedEvent, GoogleCalendarClient, PROVIDER_NAME};
use super::event::CalendarEventPayload;
use super::session::AuthSession;
use crate::error::{ProviderError, ProviderResult};

/// Turns contests into calendar events.
#[derive(Debug, Clone)]
pub struct CalendarSync {
    client: GoogleCalendarClient,
    timezone: Tz,
    reminders: bool,
}

impl CalendarSync {
    pub fn new(client: GoogleCalendarClient, timezone: Tz) -> Self {
        Self {
            client,
            timezone,
            reminders: true,
        }
    }

    /// Enables or disables the popup reminders on created events.
    pub fn with_reminders(mut self, reminders: bool) -> Self {
        self.reminders = reminders;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Creates one event for `contest`.
    ///
    /// Fails with `NotAuthenticated` before any request when `session` is
    /// anonymous. Each call inserts a new event; duplicates are not detected.
    #[tracing::instrument(skip(self, contest, session), fields(contest_id = contest.id()))]
    pub async fn add_event(
        &self,
        contest: &ContestRecord,
        session: &AuthSession,
    ) -> ProviderResult<CreatedEvent> {
        let token = session.access_token().ok_or_else(|| {
            ProviderError::not_authenticated("not authenticated with Google Calendar")
                .with_provider(PROVIDER_NAME)
        })?;

        let payload = CalendarEventPayload::for_contest(contest, &self.timezone, self.reminders)
            .map_err(|e| e.with_provider(PROVIDER_NAME))?;
        let event = self.client.insert_event(token, &payload).await?;

        info!(event_id = %event.id, "created calendar event");
        Ok(event)
    }
}
