//! Google Calendar integration.
//!
//! # Authentication
//!
//! The OAuth 2.0 implicit flow is used: the user opens the authorization URL,
//! grants the `calendar.events` scope and is redirected with the access token
//! in the URL fragment. There is no refresh token; when Google stops
//! accepting the token the session is cleared and the user logs in again.
//!
//! # Example
//!
//! ```ignore
//! use contestcal_providers::google::{
//!     CalendarSync, GoogleCalendar, GoogleCalendarClient, GoogleConfig, SessionStore,
//! };
//!
//! let config = GoogleConfig::new("1234-abc.apps.googleusercontent.com");
//! let sync = CalendarSync::new(GoogleCalendarClient::new(&config)?, chrono_tz::UTC);
//! let google = GoogleCalendar::new(config, SessionStore::open("session.json"), sync)?;
//!
//! google.authenticate(&flow).await?;
//! let event = google.add_event(&contest).await?;
//! ```

mod client;
mod config;
mod event;
mod oauth;
mod provider;
mod session;
mod sync;

pub use client::{CreatedEvent, GoogleCalendarClient};
pub use config::GoogleConfig;
pub use event::{CalendarEventPayload, EventDateTime, REMINDER_MINUTES, ReminderOverride, Reminders};
pub use oauth::{AuthorizationFlow, build_auth_url, extract_access_token};
pub use provider::GoogleCalendar;
pub use session::{AuthSession, SessionStore};
pub use sync::CalendarSync;
