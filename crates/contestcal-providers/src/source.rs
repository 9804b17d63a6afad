//! ContestSource trait definition.
//!
//! A [`ContestSource`] produces the list of upcoming contests. The cache
//! depends only on this trait, so a source can be swapped for a fake in
//! tests or for another contest site later.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use contestcal_core::ContestRecord;

use crate::error::{ProviderError, ProviderResult};

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A provider of upcoming contests.
pub trait ContestSource: Send + Sync {
    /// Short provider name used in logs and error messages.
    fn name(&self) -> &str;

    /// Fetches the current list of upcoming contests, in source order.
    ///
    /// Each call issues exactly one outbound request.
    fn fetch_upcoming(&self) -> BoxFuture<'_, ProviderResult<Vec<ContestRecord>>>;
}

/// A source that serves a fixed list or a fixed error and counts fetches.
///
/// Used as a stand-in when no network is wanted.
#[derive(Debug)]
pub struct StaticSource {
    name: String,
    outcome: Result<Vec<ContestRecord>, (crate::ProviderErrorCode, String)>,
    fetches: AtomicUsize,
}

impl StaticSource {
    /// A source that always returns `contests`.
    pub fn with_contests(name: impl Into<String>, contests: Vec<ContestRecord>) -> Self {
        Self {
            name: name.into(),
            outcome: Ok(contests),
            fetches: AtomicUsize::new(0),
        }
    }

    /// A source that always fails with `error`'s code and message.
    pub fn failing(name: impl Into<String>, error: &ProviderError) -> Self {
        Self {
            name: name.into(),
            outcome: Err((error.code(), error.message().to_string())),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ContestSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_upcoming(&self) -> BoxFuture<'_, ProviderResult<Vec<ContestRecord>>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let outcome = match &self.outcome {
            Ok(contests) => Ok(contests.clone()),
            Err((code, message)) => {
                Err(ProviderError::new(*code, message.clone()).with_provider(&self.name))
            }
        };
        Box::pin(async move { outcome })
    }
}
