//! Core types: contests, time formatting, tracing

pub mod contest;
pub mod time;
pub mod tracing;

pub use contest::{CONTEST_URL_BASE, ContestId, ContestKind, ContestRecord};
pub use time::{
    TimeError, TimeStatus, format_duration, format_start, format_time_until, local_timezone,
    parse_timezone,
};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
