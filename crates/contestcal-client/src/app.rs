//! Wiring: builds the cache, the calendar facade and the dispatcher from
//! the client configuration.

use std::sync::Arc;

use chrono_tz::Tz;
use tracing::debug;

use contestcal_providers::codeforces::CodeforcesClient;
use contestcal_providers::google::{
    AuthorizationFlow, CalendarSync, GoogleCalendar, GoogleCalendarClient, SessionStore,
};
use contestcal_server::{ContestCache, Request, RequestHandler, Response, ServerConfig};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::flow::BrowserFlow;

/// A ready-to-use dispatcher plus the settings it was built from.
#[derive(Debug)]
pub struct App {
    handler: RequestHandler,
    server_config: ServerConfig,
    timezone: Tz,
}

impl App {
    /// Builds the application with the interactive browser flow.
    pub async fn build(config: &ClientConfig, timezone: Tz, flow: BrowserFlow) -> ClientResult<Self> {
        Self::build_with_flow(config, timezone, Arc::new(flow)).await
    }

    pub async fn build_with_flow(
        config: &ClientConfig,
        timezone: Tz,
        flow: Arc<dyn AuthorizationFlow>,
    ) -> ClientResult<Self> {
        let server_config = config.server_config();
        server_config.ensure_state_dir()?;

        let source = CodeforcesClient::new(config.timeout())?;
        let cache = ContestCache::new(Arc::new(source), server_config.freshness)
            .with_store(server_config.contests_path());
        if cache.load().await {
            debug!("restored contest cache from disk");
        }

        let google_config = config.google_config();
        let sync = CalendarSync::new(GoogleCalendarClient::new(&google_config)?, timezone)
            .with_reminders(config.display.reminders);
        let store = SessionStore::open(server_config.session_path());
        let calendar = GoogleCalendar::new(google_config, store, sync)?;

        Ok(Self {
            handler: RequestHandler::new(cache, Arc::new(calendar), flow),
            server_config,
            timezone,
        })
    }

    pub fn handler(&self) -> &RequestHandler {
        &self.handler
    }

    pub fn cache(&self) -> &ContestCache {
        self.handler.cache()
    }

    pub fn server_config(&self) -> &ServerConfig {
        &self.server_config
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Dispatches `request`, turning error responses into `Err`.
    pub async fn request(&self, request: Request) -> ClientResult<Response> {
        match self.handler.handle(&request).await {
            Response::Error { error } => Err(ClientError::Request(error)),
            response => Ok(response),
        }
    }
}
