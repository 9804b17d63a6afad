//! Request/response dispatch handler.
//!
//! Routes each [`Request`] to the contest cache or the Google Calendar
//! facade. Failures never escape: they become [`Response::Error`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use contestcal_core::ContestRecord;
use contestcal_providers::google::{AuthorizationFlow, GoogleCalendar};

use crate::cache::ContestCache;
use crate::error::ServerResult;
use crate::protocol::{ErrorResponse, Request, Response};

/// Dispatches requests from a front end.
pub struct RequestHandler {
    cache: ContestCache,
    calendar: Arc<GoogleCalendar>,
    flow: Arc<dyn AuthorizationFlow>,
}

impl std::fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandler")
            .field("cache", &self.cache)
            .field("calendar", &self.calendar)
            .finish_non_exhaustive()
    }
}

impl RequestHandler {
    pub fn new(
        cache: ContestCache,
        calendar: Arc<GoogleCalendar>,
        flow: Arc<dyn AuthorizationFlow>,
    ) -> Self {
        Self {
            cache,
            calendar,
            flow,
        }
    }

    pub fn cache(&self) -> &ContestCache {
        &self.cache
    }

    pub fn calendar(&self) -> &GoogleCalendar {
        &self.calendar
    }

    /// Handles a request at the current time.
    pub async fn handle(&self, request: &Request) -> Response {
        self.handle_at(request, Utc::now()).await
    }

    /// Handles a request as if it arrived at `now`.
    #[tracing::instrument(skip(self, request), fields(request = request_name(request)))]
    pub async fn handle_at(&self, request: &Request, now: DateTime<Utc>) -> Response {
        let result = match request {
            Request::FetchContests => self.fetch_contests(now).await,
            Request::Refresh => self.refresh(now).await,
            Request::Authenticate => self.authenticate().await,
            Request::CheckAuthStatus => self.check_auth_status().await,
            Request::AddToCalendar { contest } => self.add_to_calendar(contest).await,
            Request::Logout => self.logout().await,
        };

        match result {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "request failed");
                Response::from_error(ErrorResponse::from(&e))
            }
        }
    }

    async fn fetch_contests(&self, now: DateTime<Utc>) -> ServerResult<Response> {
        let snapshot = self.cache.get_or_refresh_snapshot(now).await?;
        debug!(count = snapshot.contests().len(), "returning contests");
        let fetched_at = snapshot.last_fetched_at();
        Ok(Response::contests(snapshot.into_contests(), fetched_at))
    }

    async fn refresh(&self, now: DateTime<Utc>) -> ServerResult<Response> {
        self.cache.invalidate().await?;
        self.fetch_contests(now).await
    }

    async fn authenticate(&self) -> ServerResult<Response> {
        let session = self.calendar.authenticate(self.flow.as_ref()).await?;
        Ok(Response::auth_status(session.is_authenticated()))
    }

    async fn check_auth_status(&self) -> ServerResult<Response> {
        let authenticated = self.calendar.check_session().await?;
        Ok(Response::auth_status(authenticated))
    }

    async fn add_to_calendar(&self, contest: &ContestRecord) -> ServerResult<Response> {
        let event = self.calendar.add_event(contest).await?;
        Ok(Response::EventCreated { event })
    }

    async fn logout(&self) -> ServerResult<Response> {
        self.calendar.clear().await?;
        info!("logged out of Google Calendar");
        Ok(Response::Ok)
    }
}

fn request_name(request: &Request) -> &'static str {
    match request {
        Request::FetchContests => "fetch_contests",
        Request::Refresh => "refresh",
        Request::Authenticate => "authenticate",
        Request::CheckAuthStatus => "check_auth_status",
        Request::AddToCalendar { .. } => "add_to_calendar",
        Request::Logout => "logout",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_FRESHNESS;
    use crate::protocol::ErrorCode;
    use chrono_tz::Tz;
    use contestcal_providers::google::{
        AuthSession, CalendarSync, GoogleCalendarClient, GoogleConfig, SessionStore,
    };
    use contestcal_providers::{BoxFuture, ProviderError, ProviderResult, StaticSource};
    use std::path::Path;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct PastedRedirect(Option<String>);

    impl AuthorizationFlow for PastedRedirect {
        fn authorize<'a>(&'a self, _auth_url: &'a str) -> BoxFuture<'a, ProviderResult<Option<String>>> {
            let reply = self.0.clone();
            Box::pin(async move { Ok(reply) })
        }
    }

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_720_000_000, 0).unwrap()
    }

    fn div2() -> ContestRecord {
        ContestRecord::new(2119, "Codeforces Round (Div. 2)", 1720180500, 7200, "CF")
    }

    fn handler(
        source: Arc<StaticSource>,
        api_base: &str,
        session_path: &Path,
        session: AuthSession,
        redirect: Option<&str>,
    ) -> RequestHandler {
        let config = GoogleConfig::new("1234-abc.apps.googleusercontent.com").with_api_base(api_base);
        let client = GoogleCalendarClient::new(&config).unwrap();
        let store = SessionStore::in_memory(session_path, session);
        let calendar =
            GoogleCalendar::new(config, store, CalendarSync::new(client, Tz::UTC)).unwrap();
        RequestHandler::new(
            ContestCache::new(source, DEFAULT_FRESHNESS),
            Arc::new(calendar),
            Arc::new(PastedRedirect(redirect.map(str::to_string))),
        )
    }

    #[tokio::test]
    async fn fetch_contests_uses_cache_until_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(StaticSource::with_contests("static", vec![div2()]));
        let handler = handler(
            source.clone(),
            "http://127.0.0.1:9",
            &dir.path().join("session.json"),
            AuthSession::anonymous(),
            None,
        );

        let first = handler.handle_at(&Request::FetchContests, t0()).await;
        match first {
            Response::Contests {
                contests,
                fetched_at,
            } => {
                assert_eq!(contests, vec![div2()]);
                assert_eq!(fetched_at, t0());
            }
            other => panic!("unexpected response: {:?}", other),
        }

        let later = t0() + chrono::Duration::minutes(2);
        assert!(handler.handle_at(&Request::FetchContests, later).await.is_success());
        assert_eq!(source.fetch_count(), 1);

        let refreshed = handler.handle_at(&Request::Refresh, later).await;
        assert!(matches!(refreshed, Response::Contests { fetched_at, .. } if fetched_at == later));
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn fetch_failure_is_structured() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(StaticSource::failing(
            "static",
            &ProviderError::source_unavailable("Call limit exceeded"),
        ));
        let handler = handler(
            source,
            "http://127.0.0.1:9",
            &dir.path().join("session.json"),
            AuthSession::anonymous(),
            None,
        );

        let response = handler.handle_at(&Request::FetchContests, t0()).await;
        let error = response.as_error().unwrap();
        assert_eq!(error.code, ErrorCode::FetchFailed);
        assert!(error.message.contains("Call limit exceeded"));
    }

    #[tokio::test]
    async fn add_without_session_is_not_authenticated() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(
            Arc::new(StaticSource::with_contests("static", vec![])),
            "http://127.0.0.1:9",
            &dir.path().join("session.json"),
            AuthSession::anonymous(),
            None,
        );

        let response = handler.handle(&Request::add_to_calendar(div2())).await;
        assert_eq!(response.as_error().unwrap().code, ErrorCode::NotAuthenticated);
    }

    #[tokio::test]
    async fn add_with_out_of_range_duration_is_structured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let handler = handler(
            Arc::new(StaticSource::with_contests("static", vec![])),
            &server.uri(),
            &dir.path().join("session.json"),
            AuthSession::authenticated("ya29.token"),
            None,
        );

        let request: Request = serde_json::from_value(serde_json::json!({
            "type": "add_to_calendar",
            "contest": {
                "id": 2119,
                "name": "Endless",
                "startTimeSeconds": 1720180500,
                "durationSeconds": 10_000_000_000_000_i64,
                "type": "CF"
            }
        }))
        .unwrap();

        let response = handler.handle(&request).await;
        assert_eq!(
            response.as_error().unwrap().code,
            ErrorCode::CalendarWriteFailed
        );
        server.verify().await;
    }

    #[tokio::test]
    async fn login_add_and_logout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(header("authorization", "Bearer ya29.pasted"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "evt-1",
                "htmlLink": "https://calendar.google.com/event?eid=evt-1",
                "status": "confirmed"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        let handler = handler(
            Arc::new(StaticSource::with_contests("static", vec![])),
            &server.uri(),
            &session_path,
            AuthSession::anonymous(),
            Some("http://localhost/#access_token=ya29.pasted&token_type=Bearer&expires_in=3599"),
        );

        let response = handler.handle(&Request::Authenticate).await;
        assert_eq!(response, Response::auth_status(true));
        assert!(session_path.exists());

        match handler.handle(&Request::add_to_calendar(div2())).await {
            Response::EventCreated { event } => {
                assert_eq!(event.id, "evt-1");
                assert_eq!(event.status.as_deref(), Some("confirmed"));
            }
            other => panic!("unexpected response: {:?}", other),
        }

        assert_eq!(handler.handle(&Request::Logout).await, Response::Ok);
        assert!(!session_path.exists());
        assert_eq!(handler.handle(&Request::Logout).await, Response::Ok);
    }

    #[tokio::test]
    async fn cancelled_login_is_authentication_failed() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(
            Arc::new(StaticSource::with_contests("static", vec![])),
            "http://127.0.0.1:9",
            &dir.path().join("session.json"),
            AuthSession::anonymous(),
            None,
        );

        let response = handler.handle(&Request::Authenticate).await;
        assert_eq!(
            response.as_error().unwrap().code,
            ErrorCode::AuthenticationFailed
        );
    }

    #[tokio::test]
    async fn check_auth_status_clears_rejected_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let handler = handler(
            Arc::new(StaticSource::with_contests("static", vec![])),
            &server.uri(),
            &dir.path().join("session.json"),
            AuthSession::authenticated("expired"),
            None,
        );

        let response = handler.handle(&Request::CheckAuthStatus).await;
        assert_eq!(response, Response::auth_status(false));
        assert!(!handler.calendar().session().await.is_authenticated());
    }
}
