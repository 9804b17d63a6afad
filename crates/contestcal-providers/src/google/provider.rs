//! Google Calendar facade: session lifecycle plus event creation.

use contestcal_core::ContestRecord;
use tracing::{debug, info, warn};

use super::client::{CreatedEvent, GoogleCalendarClient, PROVIDER_NAME};
use super::config::GoogleConfig;
use super::oauth::{AuthorizationFlow, build_auth_url, extract_access_token};
use super::session::{AuthSession, SessionStore};
use super::sync::CalendarSync;
use crate::error::{ProviderError, ProviderResult};

/// The user's Google Calendar as seen by the application.
///
/// Owns the persisted [`SessionStore`]; only [`authenticate`](Self::authenticate),
/// [`clear`](Self::clear) and a rejected [`check_session`](Self::check_session)
/// change it.
#[derive(Debug)]
pub struct GoogleCalendar {
    config: GoogleConfig,
    client: GoogleCalendarClient,
    sync: CalendarSync,
    store: SessionStore,
}

impl GoogleCalendar {
    /// Creates the facade. `sync` decides how events are rendered.
    pub fn new(config: GoogleConfig, store: SessionStore, sync: CalendarSync) -> ProviderResult<Self> {
        let client = GoogleCalendarClient::new(&config)?;
        Ok(Self {
            config,
            client,
            sync,
            store,
        })
    }

    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    /// Returns the current session.
    pub async fn session(&self) -> AuthSession {
        self.store.current().await
    }

    /// Runs the implicit flow through `flow` and stores the new session.
    pub async fn authenticate(&self, flow: &dyn AuthorizationFlow) -> ProviderResult<AuthSession> {
        self.config.validate().map_err(|e| {
            ProviderError::configuration(format!("invalid Google configuration: {}", e))
                .with_provider(PROVIDER_NAME)
        })?;

        let auth_url = build_auth_url(&self.config)?;
        debug!(%auth_url, "starting authorization flow");

        let redirect = flow
            .authorize(&auth_url)
            .await
            .map_err(|e| {
                ProviderError::authentication(format!("authorization flow failed: {}", e.message()))
                    .with_provider(PROVIDER_NAME)
                    .with_source(e)
            })?
            .ok_or_else(|| {
                ProviderError::authentication("authorization cancelled").with_provider(PROVIDER_NAME)
            })?;

        let token = extract_access_token(&redirect).map_err(|e| e.with_provider(PROVIDER_NAME))?;
        let session = AuthSession::authenticated(token);
        self.store.set(session.clone()).await?;

        info!("authenticated with Google Calendar");
        Ok(session)
    }

    /// Returns true if the calendar API accepts `session`'s token.
    ///
    /// Anonymous sessions are invalid without a request; transport failures
    /// count as invalid.
    pub async fn is_valid(&self, session: &AuthSession) -> bool {
        let Some(token) = session.access_token() else {
            return false;
        };
        match self.client.check_access(token).await {
            Ok(valid) => valid,
            Err(e) => {
                warn!(error = %e, "could not verify Google session");
                false
            }
        }
    }

    /// Validates the stored session, clearing it if the API rejects it.
    ///
    /// A transport failure reports `false` but keeps the session.
    pub async fn check_session(&self) -> ProviderResult<bool> {
        let session = self.store.current().await;
        let Some(token) = session.access_token() else {
            return Ok(false);
        };

        match self.client.check_access(token).await {
            Ok(true) => Ok(true),
            Ok(false) => {
                info!("Google rejected the stored token, clearing session");
                self.store.clear().await?;
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "could not verify Google session");
                Ok(false)
            }
        }
    }

    /// Logs out. Idempotent.
    pub async fn clear(&self) -> ProviderResult<()> {
        self.store.clear().await
    }

    /// Adds `contest` to the calendar using the stored session.
    pub async fn add_event(&self, contest: &ContestRecord) -> ProviderResult<CreatedEvent> {
        let session = self.store.current().await;
        self.sync.add_event(contest, &session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::source::BoxFuture;
    use chrono_tz::Tz;
    use std::path::Path;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Replies with a fixed redirect and records the URL it was shown.
    struct CannedFlow {
        reply: ProviderResult<Option<String>>,
        seen: Mutex<Option<String>>,
    }

    impl CannedFlow {
        fn new(reply: ProviderResult<Option<String>>) -> Self {
            Self {
                reply,
                seen: Mutex::new(None),
            }
        }
    }

    impl AuthorizationFlow for CannedFlow {
        fn authorize<'a>(&'a self, auth_url: &'a str) -> BoxFuture<'a, ProviderResult<Option<String>>> {
            *self.seen.lock().unwrap() = Some(auth_url.to_string());
            let reply = match &self.reply {
                Ok(url) => Ok(url.clone()),
                Err(e) => Err(ProviderError::new(e.code(), e.message())),
            };
            Box::pin(async move { reply })
        }
    }

    /// A local address nothing listens on.
    fn closed_port_uri() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}", port)
    }

    fn calendar(api_base: &str, session_path: &Path, session: AuthSession) -> GoogleCalendar {
        let config = GoogleConfig::new("1234-abc.apps.googleusercontent.com").with_api_base(api_base);
        let client = GoogleCalendarClient::new(&config).unwrap();
        let store = SessionStore::in_memory(session_path, session);
        GoogleCalendar::new(config, store, CalendarSync::new(client, Tz::UTC)).unwrap()
    }

    #[tokio::test]
    async fn authenticate_persists_token() {
        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        let google = calendar("http://127.0.0.1:9", &session_path, AuthSession::anonymous());
        let flow = CannedFlow::new(Ok(Some(
            "http://localhost/#access_token=ya29.fresh&token_type=Bearer".to_string(),
        )));

        let session = google.authenticate(&flow).await.unwrap();
        assert_eq!(session.access_token(), Some("ya29.fresh"));
        assert!(google.session().await.is_authenticated());
        assert!(session_path.exists());

        let shown = flow.seen.lock().unwrap().clone().unwrap();
        assert!(shown.contains("response_type=token"));
    }

    #[tokio::test]
    async fn cancelled_or_failed_flow_is_authentication_failed() {
        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        let google = calendar("http://127.0.0.1:9", &session_path, AuthSession::anonymous());

        let err = google.authenticate(&CannedFlow::new(Ok(None))).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);

        let denied = CannedFlow::new(Ok(Some("http://localhost/#error=access_denied".into())));
        let err = google.authenticate(&denied).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);

        let broken = CannedFlow::new(Err(ProviderError::internal("browser crashed")));
        let err = google.authenticate(&broken).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);

        assert!(!google.session().await.is_authenticated());
        assert!(!session_path.exists());
    }

    #[tokio::test]
    async fn rejected_token_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        let google = calendar(&server.uri(), &session_path, AuthSession::anonymous());
        google
            .store
            .set(AuthSession::authenticated("expired"))
            .await
            .unwrap();

        assert!(!google.check_session().await.unwrap());
        assert!(!google.session().await.is_authenticated());
        assert!(!session_path.exists());
    }

    #[tokio::test]
    async fn accepted_token_keeps_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "me"})))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let google = calendar(
            &server.uri(),
            &dir.path().join("session.json"),
            AuthSession::authenticated("live"),
        );

        assert!(google.check_session().await.unwrap());
        assert!(google.is_valid(&AuthSession::authenticated("live")).await);
        assert!(google.session().await.is_authenticated());
    }

    #[tokio::test]
    async fn unreachable_api_keeps_session() {
        let dir = tempfile::tempdir().unwrap();
        let google = calendar(
            &closed_port_uri(),
            &dir.path().join("session.json"),
            AuthSession::authenticated("maybe"),
        );

        assert!(!google.check_session().await.unwrap());
        assert!(google.session().await.is_authenticated());
    }

    #[tokio::test]
    async fn anonymous_is_invalid_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let google = calendar(
            &server.uri(),
            &dir.path().join("session.json"),
            AuthSession::anonymous(),
        );

        assert!(!google.is_valid(&AuthSession::anonymous()).await);
        assert!(!google.check_session().await.unwrap());
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let google = calendar(
            "http://127.0.0.1:9",
            &dir.path().join("session.json"),
            AuthSession::authenticated("tok"),
        );

        google.clear().await.unwrap();
        google.clear().await.unwrap();
        assert!(!google.session().await.is_authenticated());

        let err = google
            .add_event(&ContestRecord::new(1, "Round", 1720180500, 7200, "CF"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::NotAuthenticated);
    }
}
