//! Fetching raw leaderboards from the data provider.
//!
//! Every provider call goes through [`fetch_leaderboard_gated`], which
//! consults the TTL cache first and spends rate-limit budget only on a miss.

pub mod cache;
pub mod client;

pub use cache::{CachedLeaderboard, DEFAULT_TTL, LeaderboardCache};
pub use client::RapidApiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::CoreError;
use crate::rate_limit::RateLimiter;
use crate::storage::CounterStore;

pub const DEFAULT_ORG_ID: &str = "1";
pub const DEFAULT_TOURN_ID: &str = "033";
pub const DEFAULT_YEAR: &str = "2025";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRequest {
    pub org_id: String,
    pub tourn_id: String,
    pub year: String,
}

impl Default for LeaderboardRequest {
    fn default() -> Self {
        Self::new(DEFAULT_ORG_ID, DEFAULT_TOURN_ID, DEFAULT_YEAR)
    }
}

impl LeaderboardRequest {
    #[must_use]
    pub fn new(
        org_id: impl Into<String>,
        tourn_id: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            org_id: org_id.into(),
            tourn_id: tourn_id.into(),
            year: year.into(),
        }
    }

    /// Query parameters sorted by name, doubling as the cache key.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let mut params = [
            ("orgId", self.org_id.as_str()),
            ("tournId", self.tourn_id.as_str()),
            ("year", self.year.as_str()),
        ];
        params.sort_by_key(|(k, _)| *k);
        params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[async_trait]
pub trait LeaderboardProvider: Send + Sync {
    async fn fetch_leaderboard(&self, request: &LeaderboardRequest) -> Result<Value, CoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardSource {
    Provider,
    Cache,
    StaleCache,
}

impl fmt::Display for LeaderboardSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LeaderboardSource::Provider => "provider",
            LeaderboardSource::Cache => "cache",
            LeaderboardSource::StaleCache => "stale cache",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone)]
pub struct FetchedLeaderboard {
    pub payload: Value,
    pub source: LeaderboardSource,
}

/// Everything a gated fetch touches.
#[derive(Clone, Copy)]
pub struct FetchDeps<'a> {
    pub provider: &'a dyn LeaderboardProvider,
    pub limiter: &'a RateLimiter,
    pub counters: &'a dyn CounterStore,
    pub cache: &'a LeaderboardCache,
}

/// Return a fresh cached leaderboard, or spend one call on the provider.
///
/// When the budget is spent or the provider fails, any cached copy is
/// served regardless of age. No retries.
///
/// # Errors
/// Returns the rate-limit or provider error when there is nothing cached
/// to fall back on.
pub async fn fetch_leaderboard_gated(
    deps: FetchDeps<'_>,
    request: &LeaderboardRequest,
) -> Result<FetchedLeaderboard, CoreError> {
    let key = request.cache_key();
    if let Some(hit) = deps.cache.get_fresh(&key).await {
        log::debug!("leaderboard cache hit for {key}");
        return Ok(FetchedLeaderboard {
            payload: hit.payload,
            source: LeaderboardSource::Cache,
        });
    }

    let fetched = match deps.limiter.try_acquire_api_call(deps.counters).await {
        Ok(_) => deps.provider.fetch_leaderboard(request).await,
        Err(e) => Err(e),
    };

    match fetched {
        Ok(payload) => {
            deps.cache.put(&key, payload.clone()).await;
            Ok(FetchedLeaderboard {
                payload,
                source: LeaderboardSource::Provider,
            })
        }
        Err(e) => match deps.cache.get_any(&key).await {
            Some(stale) => {
                log::warn!(
                    "serving leaderboard cached at {} for {key}: {e}",
                    stale.fetched_at
                );
                Ok(FetchedLeaderboard {
                    payload: stale.payload,
                    source: LeaderboardSource::StaleCache,
                })
            }
            None => Err(e),
        },
    }
}
