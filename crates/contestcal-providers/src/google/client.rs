//! Google Calendar API client.
//!
//! Low-level HTTP calls against Calendar API v3: the token liveness check
//! and event insertion. Session handling lives in the callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::config::GoogleConfig;
use super::event::CalendarEventPayload;
use crate::error::{ProviderError, ProviderResult};

pub(crate) const PROVIDER_NAME: &str = "google";

/// Calendar the events are written to.
const PRIMARY_CALENDAR: &str = "primary";

/// An event as returned by `events.insert`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    pub id: String,
    #[serde(default)]
    pub html_link: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Everything else the API returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Google Calendar API client.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    api_base: String,
}

impl GoogleCalendarClient {
    pub fn new(config: &GoogleConfig) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::configuration("failed to create HTTP client")
                    .with_provider(PROVIDER_NAME)
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            api_base: config.api_base.clone(),
        })
    }

    fn calendar_url(&self) -> String {
        format!(
            "{}/calendars/{}",
            self.api_base,
            urlencoding::encode(PRIMARY_CALENDAR)
        )
    }

    /// Probes the primary calendar with `access_token`.
    ///
    /// Returns `Ok(false)` when the API rejects the token and `Err` only on
    /// transport failure.
    pub async fn check_access(&self, access_token: &str) -> ProviderResult<bool> {
        let response = self
            .http_client
            .get(self.calendar_url())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(e).with_provider(PROVIDER_NAME))?;

        let status = response.status();
        debug!(http_status = %status, "calendar access check");
        Ok(status.is_success())
    }

    /// Inserts `payload` into the primary calendar.
    pub async fn insert_event(
        &self,
        access_token: &str,
        payload: &CalendarEventPayload,
    ) -> ProviderResult<CreatedEvent> {
        let url = format!("{}/events", self.calendar_url());

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .json(payload)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(e).with_provider(PROVIDER_NAME))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::calendar_write(format!(
                "failed to create event ({}): {}",
                status, body
            ))
            .with_provider(PROVIDER_NAME));
        }

        let body = response.text().await.map_err(|e| {
            ProviderError::network("failed to read response body")
                .with_provider(PROVIDER_NAME)
                .with_source(e)
        })?;

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response("failed to parse created event")
                .with_provider(PROVIDER_NAME)
                .with_source(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use chrono_tz::Tz;
    use contestcal_core::ContestRecord;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GoogleCalendarClient {
        let config = GoogleConfig::new("id.apps.googleusercontent.com").with_api_base(server.uri());
        GoogleCalendarClient::new(&config).unwrap()
    }

    fn payload() -> CalendarEventPayload {
        let contest = ContestRecord::new(2119, "Codeforces Round (Div. 2)", 1720180500, 7200, "CF");
        CalendarEventPayload::for_contest(&contest, &Tz::UTC, true).unwrap()
    }

    #[tokio::test]
    async fn check_access_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary"))
            .and(header("authorization", "Bearer good"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "me"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.check_access("good").await.unwrap());
        assert!(!client.check_access("stale").await.unwrap());
    }

    #[tokio::test]
    async fn insert_event_returns_created_event() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(header("authorization", "Bearer tok"))
            .and(body_partial_json(serde_json::json!({
                "summary": "Codeforces Round (Div. 2)",
                "reminders": {"useDefault": false}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "calendar#event",
                "id": "evt123",
                "status": "confirmed",
                "htmlLink": "https://www.google.com/calendar/event?eid=evt123",
                "summary": "Codeforces Round (Div. 2)"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let event = client_for(&server).insert_event("tok", &payload()).await.unwrap();
        assert_eq!(event.id, "evt123");
        assert_eq!(event.status.as_deref(), Some("confirmed"));
        assert_eq!(event.extra.get("kind"), Some(&serde_json::json!("calendar#event")));
    }

    #[tokio::test]
    async fn rejected_insert_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(403).set_body_string("insufficientPermissions"))
            .mount(&server)
            .await;

        let err = client_for(&server).insert_event("tok", &payload()).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::CalendarWriteFailed);
        assert!(err.message().contains("insufficientPermissions"));
    }
}
