//! Codeforces contest source.
//!
//! Fetches `contest.list`, keeps contests that have not started yet
//! (phase `BEFORE`) and caps the list at [`CodeforcesClient::MAX_UPCOMING`]
//! entries in the order the API returns them.

mod api;
mod client;

pub use api::{ApiContest, ApiResponse, PHASE_BEFORE, normalize_contests};
pub use client::CodeforcesClient;
