//! HTTP client for the Codeforces contest listing.

use std::time::Duration;

use contestcal_core::ContestRecord;
use tracing::{debug, info};

use super::api::{ApiResponse, normalize_contests};
use crate::error::{ProviderError, ProviderResult};
use crate::source::{BoxFuture, ContestSource};

const PROVIDER_NAME: &str = "codeforces";

/// Contest source backed by `GET {base}/contest.list`.
#[derive(Debug, Clone)]
pub struct CodeforcesClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CodeforcesClient {
    /// Public API root.
    pub const DEFAULT_BASE_URL: &'static str = "https://codeforces.com/api";

    /// Number of upcoming contests kept per fetch.
    pub const MAX_UPCOMING: usize = 10;

    /// Creates a client with the given request timeout.
    pub fn new(timeout: Duration) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("contestcal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ProviderError::configuration("failed to create HTTP client")
                    .with_provider(PROVIDER_NAME)
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Points the client at another API root (used against mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn list_url(&self) -> String {
        format!("{}/contest.list", self.base_url)
    }

    /// Fetches and normalizes the upcoming contests.
    #[tracing::instrument(skip(self), fields(url = %self.list_url()))]
    pub async fn fetch(&self) -> ProviderResult<Vec<ContestRecord>> {
        let response = self
            .http_client
            .get(self.list_url())
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(e).with_provider(PROVIDER_NAME))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::network("failed to read response body")
                .with_provider(PROVIDER_NAME)
                .with_source(e)
        })?;

        // Codeforces reports API failures in the body, often with a 4xx status.
        let parsed: ApiResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) if !status.is_success() => {
                return Err(ProviderError::source_unavailable(format!("HTTP {}", status))
                    .with_provider(PROVIDER_NAME)
                    .with_source(e));
            }
            Err(e) => {
                return Err(ProviderError::invalid_response("failed to parse contest list")
                    .with_provider(PROVIDER_NAME)
                    .with_source(e));
            }
        };

        let contests =
            normalize_contests(parsed, Self::MAX_UPCOMING).map_err(|e| e.with_provider(PROVIDER_NAME))?;

        debug!(http_status = %status, count = contests.len(), "fetched upcoming contests");
        info!(count = contests.len(), "contest list refreshed from source");
        Ok(contests)
    }
}

impl ContestSource for CodeforcesClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn fetch_upcoming(&self) -> BoxFuture<'_, ProviderResult<Vec<ContestRecord>>> {
        Box::pin(self.fetch())
    }
}
