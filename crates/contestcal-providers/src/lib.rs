//! Contest source and calendar clients.
//!
//! - [`ContestSource`]: the trait the contest cache fetches through
//! - [`codeforces::CodeforcesClient`]: the Codeforces implementation
//! - [`google`]: OAuth session, event payload and event creation for
//!   Google Calendar
//! - [`ProviderError`]: the error type shared by all of the above
//!
//! ```text
//! ┌──────────────────┐        ┌──────────────────────┐
//! │ Codeforces API   │        │ Google Calendar API  │
//! └────────┬─────────┘        └──────────┬───────────┘
//!          │                             │
//!          ▼                             ▼
//! ┌──────────────────┐        ┌──────────────────────┐
//! │ CodeforcesClient │        │ GoogleCalendar       │
//! └────────┬─────────┘        │  SessionStore        │
//!          │ ContestSource    │  CalendarSync        │
//!          ▼                  └──────────────────────┘
//!   Vec<ContestRecord>
//! ```

pub mod codeforces;
pub mod error;
pub mod google;
pub mod persist;
pub mod source;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use persist::JsonRecord;
pub use source::{BoxFuture, ContestSource, StaticSource};
