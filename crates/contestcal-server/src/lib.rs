//! Contest cache, refresh scheduler and request dispatcher.
//!
//! This crate holds the stateful side of contestcal:
//! - a TTL cache of upcoming contests with at most one refresh in flight
//! - a background scheduler that keeps the cache warm
//! - a dispatcher turning typed requests into typed responses
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use contestcal_providers::codeforces::CodeforcesClient;
//! use contestcal_server::{ContestCache, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let source = Arc::new(CodeforcesClient::new(Duration::from_secs(30))?);
//!     let cache = ContestCache::new(source, config.freshness).with_store(config.contests_path());
//!     cache.load().await;
//!
//!     let contests = cache.get_or_refresh(chrono::Utc::now()).await?;
//!     println!("{} upcoming contests", contests.len());
//!     Ok(())
//! }
//! ```

mod cache;
mod config;
mod error;
mod handler;
mod protocol;
mod scheduler;

pub use cache::{CacheSnapshot, ContestCache, DEFAULT_FRESHNESS};
pub use config::{CONTESTS_FILE, SESSION_FILE, ServerConfig, default_state_dir};
pub use error::{ServerError, ServerResult};
pub use handler::RequestHandler;
pub use protocol::{ErrorCode, ErrorResponse, Request, Response};
pub use scheduler::{
    Scheduler, SchedulerCommand, SchedulerConfig, SchedulerHandle, SchedulerState,
    SharedSchedulerState,
};
