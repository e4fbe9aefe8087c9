use super::{CounterStore, SnapshotStore, StorageError};
use crate::model::{CalculationSnapshot, RateLimitCounters};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SnapshotMap = Arc<RwLock<HashMap<String, CalculationSnapshot>>>;

/// Process-local store. Cloning shares the same maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshots: SnapshotMap,
    counters: Arc<RwLock<Option<RateLimitCounters>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot_count(&self) -> usize {
        self.snapshots.read().await.len()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load_snapshot(
        &self,
        tournament_id: &str,
    ) -> Result<Option<CalculationSnapshot>, StorageError> {
        let map = self.snapshots.read().await;
        Ok(map.get(tournament_id).cloned())
    }

    async fn store_snapshot(
        &self,
        tournament_id: &str,
        snapshot: &CalculationSnapshot,
    ) -> Result<(), StorageError> {
        let mut map = self.snapshots.write().await;
        map.insert(tournament_id.to_string(), snapshot.clone());
        Ok(())
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn load_counters(&self) -> Result<Option<RateLimitCounters>, StorageError> {
        Ok(self.counters.read().await.clone())
    }

    async fn store_counters(&self, counters: &RateLimitCounters) -> Result<(), StorageError> {
        *self.counters.write().await = Some(counters.clone());
        Ok(())
    }
}
