mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::model::{CalculationSnapshot, RateLimitCounters};
use async_trait::async_trait;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone)]
pub struct StorageError {
    message: String,
}

impl StorageError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for StorageError {}

impl From<String> for StorageError {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for StorageError {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::new(value.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::new(value.to_string())
    }
}

/// Persisted calculation results, one per tournament. A store replaces the
/// whole snapshot; readers never see a partial write.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load_snapshot(
        &self,
        tournament_id: &str,
    ) -> Result<Option<CalculationSnapshot>, StorageError>;
    async fn store_snapshot(
        &self,
        tournament_id: &str,
        snapshot: &CalculationSnapshot,
    ) -> Result<(), StorageError>;
}

/// Rate limiter counters that survive a restart.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn load_counters(&self) -> Result<Option<RateLimitCounters>, StorageError>;
    async fn store_counters(&self, counters: &RateLimitCounters) -> Result<(), StorageError>;
}
