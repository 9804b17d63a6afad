//! Contest cache with a freshness window and single-flight refresh.
//!
//! The cache holds at most one [`CacheSnapshot`]: the contest list from the
//! last successful fetch and the instant it was taken. Callers ask for
//! contests at a given `now`; a fresh snapshot is served as is, a stale or
//! missing one triggers a refresh through the [`ContestSource`].
//!
//! Concurrent callers that find the cache stale share one refresh: the first
//! one parks a [`Shared`] future in the in-flight slot and later ones await a
//! clone of it.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use contestcal_core::ContestRecord;
use contestcal_providers::{ContestSource, JsonRecord, ProviderError};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::{ServerError, ServerResult};

/// Default maximum age of a served snapshot.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(5 * 60);

/// The contest list from one successful fetch.
///
/// Persisted as `{"contests": [...], "lastFetch": <epoch millis>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    contests: Vec<ContestRecord>,
    #[serde(rename = "lastFetch", with = "chrono::serde::ts_milliseconds")]
    last_fetched_at: DateTime<Utc>,
}

impl CacheSnapshot {
    pub fn new(contests: Vec<ContestRecord>, last_fetched_at: DateTime<Utc>) -> Self {
        Self {
            contests,
            last_fetched_at,
        }
    }

    pub fn contests(&self) -> &[ContestRecord] {
        &self.contests
    }

    pub fn into_contests(self) -> Vec<ContestRecord> {
        self.contests
    }

    pub fn last_fetched_at(&self) -> DateTime<Utc> {
        self.last_fetched_at
    }

    /// Returns true if the snapshot is younger than `freshness` at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, freshness: Duration) -> bool {
        match (now - self.last_fetched_at).to_std() {
            Ok(age) => age < freshness,
            // `now` before the fetch: a clock step backwards, still fresh.
            Err(_) => true,
        }
    }
}

type RefreshOutcome = Result<CacheSnapshot, Arc<ProviderError>>;
type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

struct InFlight {
    generation: u64,
    refresh: SharedRefresh,
}

/// The contest cache.
///
/// Cheap to clone; clones share the same snapshot and in-flight slot.
#[derive(Clone)]
pub struct ContestCache {
    source: Arc<dyn ContestSource>,
    freshness: Duration,
    snapshot: Arc<RwLock<Option<CacheSnapshot>>>,
    store: Option<Arc<JsonRecord<CacheSnapshot>>>,
    in_flight: Arc<Mutex<Option<InFlight>>>,
    generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for ContestCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContestCache")
            .field("source", &self.source.name())
            .field("freshness", &self.freshness)
            .field("store", &self.store.as_ref().map(|s| s.path().to_path_buf()))
            .finish()
    }
}

impl ContestCache {
    /// Creates an empty, memory-only cache.
    pub fn new(source: Arc<dyn ContestSource>, freshness: Duration) -> Self {
        Self {
            source,
            freshness,
            snapshot: Arc::new(RwLock::new(None)),
            store: None,
            in_flight: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Mirrors every successful refresh to `path`.
    pub fn with_store(mut self, path: impl Into<PathBuf>) -> Self {
        self.store = Some(Arc::new(JsonRecord::new(path)));
        self
    }

    /// Loads the persisted snapshot, if any. Returns true if one was loaded.
    ///
    /// An unreadable record is logged and ignored.
    pub async fn load(&self) -> bool {
        let Some(store) = &self.store else {
            return false;
        };

        match store.load() {
            Ok(Some(snapshot)) => {
                info!(
                    count = snapshot.contests.len(),
                    last_fetch = %snapshot.last_fetched_at,
                    "loaded persisted contests"
                );
                *self.snapshot.write().await = Some(snapshot);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable contest cache");
                false
            }
        }
    }

    /// Returns the current snapshot without refreshing.
    pub async fn snapshot(&self) -> Option<CacheSnapshot> {
        self.snapshot.read().await.clone()
    }

    pub async fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.read().await.as_ref().map(|s| s.last_fetched_at)
    }

    /// Returns true if a snapshot exists and is fresh at `now`.
    pub async fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.fresh_snapshot(now).await.is_some()
    }

    async fn fresh_snapshot(&self, now: DateTime<Utc>) -> Option<CacheSnapshot> {
        self.snapshot
            .read()
            .await
            .as_ref()
            .filter(|s| s.is_fresh(now, self.freshness))
            .cloned()
    }

    /// Returns the upcoming contests, refreshing first if the cache is stale.
    pub async fn get_or_refresh(&self, now: DateTime<Utc>) -> ServerResult<Vec<ContestRecord>> {
        self.get_or_refresh_snapshot(now)
            .await
            .map(CacheSnapshot::into_contests)
    }

    /// Like [`get_or_refresh`](Self::get_or_refresh), keeping the fetch time.
    ///
    /// A failed refresh leaves the previous snapshot in place and is reported
    /// as [`ServerError::FetchFailed`] to the callers that awaited it.
    pub async fn get_or_refresh_snapshot(&self, now: DateTime<Utc>) -> ServerResult<CacheSnapshot> {
        if let Some(snapshot) = self.fresh_snapshot(now).await {
            debug!(count = snapshot.contests.len(), "serving cached contests");
            return Ok(snapshot);
        }

        let (generation, refresh) = {
            let mut slot = self.in_flight.lock().await;

            // A refresh may have landed while we waited for the slot.
            if let Some(snapshot) = self.fresh_snapshot(now).await {
                return Ok(snapshot);
            }

            match slot.as_ref() {
                Some(in_flight) => {
                    debug!("joining in-flight refresh");
                    (in_flight.generation, in_flight.refresh.clone())
                }
                None => {
                    let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
                    let refresh = self.start_refresh(now);
                    *slot = Some(InFlight {
                        generation,
                        refresh: refresh.clone(),
                    });
                    (generation, refresh)
                }
            }
        };

        let outcome = refresh.await;

        {
            let mut slot = self.in_flight.lock().await;
            if slot.as_ref().is_some_and(|f| f.generation == generation) {
                *slot = None;
            }
        }

        outcome.map_err(ServerError::FetchFailed)
    }

    fn start_refresh(&self, now: DateTime<Utc>) -> SharedRefresh {
        let source = Arc::clone(&self.source);
        let snapshot = Arc::clone(&self.snapshot);
        let store = self.store.clone();

        async move {
            debug!(source = source.name(), "refreshing contests");
            let contests = source.fetch_upcoming().await.map_err(|e| {
                warn!(error = %e, "contest refresh failed");
                Arc::new(e)
            })?;

            let fresh = CacheSnapshot::new(contests, now);
            *snapshot.write().await = Some(fresh.clone());

            if let Some(store) = store
                && let Err(e) = store.save(&fresh)
            {
                warn!(error = %e, "failed to persist contests");
            }

            info!(count = fresh.contests.len(), "contest cache refreshed");
            RefreshOutcome::Ok(fresh)
        }
        .boxed()
        .shared()
    }

    /// Drops the snapshot in memory and on disk so the next call refetches.
    pub async fn invalidate(&self) -> ServerResult<()> {
        *self.snapshot.write().await = None;
        if let Some(store) = &self.store {
            store.remove()?;
        }
        debug!("contest cache invalidated");
        Ok(())
    }
}
