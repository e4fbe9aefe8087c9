use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clock::Clock;

pub const DEFAULT_TTL: Duration = Duration::hours(1);

#[derive(Debug, Clone)]
pub struct CachedLeaderboard {
    pub payload: Value,
    pub fetched_at: DateTime<Utc>,
}

pub type LeaderboardMap = Arc<RwLock<HashMap<String, CachedLeaderboard>>>;

/// Raw provider responses keyed by request parameters. Entries past the TTL
/// are kept so they can still be served when the provider is unavailable.
#[derive(Clone)]
pub struct LeaderboardCache {
    entries: LeaderboardMap,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl LeaderboardCache {
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::default(),
            ttl,
            clock,
        }
    }

    /// Entry younger than the TTL.
    pub async fn get_fresh(&self, key: &str) -> Option<CachedLeaderboard> {
        let now = self.clock.now();
        let map = self.entries.read().await;
        map.get(key)
            .filter(|entry| now - entry.fetched_at < self.ttl)
            .cloned()
    }

    /// Entry of any age.
    pub async fn get_any(&self, key: &str) -> Option<CachedLeaderboard> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn put(&self, key: &str, payload: Value) {
        let entry = CachedLeaderboard {
            payload,
            fetched_at: self.clock.now(),
        };
        self.entries.write().await.insert(key.to_string(), entry);
    }
}
