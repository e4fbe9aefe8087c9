use super::{CounterStore, SnapshotStore, StorageError};
use crate::model::{CalculationSnapshot, RateLimitCounters};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// JSON documents under a root directory:
/// `tournaments/{id}/scores.json` and `rate_limit/counters.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn scores_path(&self, tournament_id: &str) -> PathBuf {
        self.root
            .join("tournaments")
            .join(sanitize_key(tournament_id))
            .join("scores.json")
    }

    #[must_use]
    pub fn counters_path(&self) -> PathBuf {
        self.root.join("rate_limit").join("counters.json")
    }

    async fn read_json<T>(path: &Path) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned,
    {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::new(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    // Readers only ever see the old file or the new one: the payload goes to
    // a sibling temp file first and is renamed over the target.
    async fn write_json<T>(path: &Path, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let parent = path
            .parent()
            .ok_or_else(|| StorageError::new(format!("no parent dir for {}", path.display())))?;
        tokio::fs::create_dir_all(parent).await?;

        let payload = serde_json::to_vec_pretty(value)?;
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = parent.join(format!(".tmp-{}-{seq}", std::process::id()));
        tokio::fs::write(&tmp, payload).await?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::new(format!(
                "failed to replace {}: {e}",
                path.display()
            )));
        }
        Ok(())
    }
}

fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl SnapshotStore for FileStore {
    async fn load_snapshot(
        &self,
        tournament_id: &str,
    ) -> Result<Option<CalculationSnapshot>, StorageError> {
        Self::read_json(&self.scores_path(tournament_id)).await
    }

    async fn store_snapshot(
        &self,
        tournament_id: &str,
        snapshot: &CalculationSnapshot,
    ) -> Result<(), StorageError> {
        Self::write_json(&self.scores_path(tournament_id), snapshot).await
    }
}

#[async_trait]
impl CounterStore for FileStore {
    async fn load_counters(&self) -> Result<Option<RateLimitCounters>, StorageError> {
        Self::read_json(&self.counters_path()).await
    }

    async fn store_counters(&self, counters: &RateLimitCounters) -> Result<(), StorageError> {
        Self::write_json(&self.counters_path(), counters).await
    }
}
