//! Storage for the single dashboard document

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use crate::model::DashboardStats;
use crate::Result;

/// A collection that holds at most one dashboard document.
///
/// `upsert` replaces whatever is stored; concurrent writers race and the
/// last one wins.
#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn find_one(&self) -> Result<Option<DashboardStats>>;
    async fn upsert(&self, stats: DashboardStats) -> Result<DashboardStats>;
    async fn clear(&self) -> Result<()>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStatsStore {
    slot: RwLock<Option<DashboardStats>>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn find_one(&self) -> Result<Option<DashboardStats>> {
        Ok(self.slot.read().await.clone())
    }

    async fn upsert(&self, stats: DashboardStats) -> Result<DashboardStats> {
        *self.slot.write().await = Some(stats.clone());
        Ok(stats)
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.write().await = None;
        Ok(())
    }
}

/// Keeps the document as a JSON file
#[derive(Debug)]
pub struct FileStatsStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileStatsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StatsStore for FileStatsStore {
    async fn find_one(&self) -> Result<Option<DashboardStats>> {
        let _guard = self.lock.read().await;
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn upsert(&self, stats: DashboardStats) -> Result<DashboardStats> {
        let _guard = self.lock.write().await;
        let bytes = serde_json::to_vec_pretty(&stats)?;

        // Write then rename so readers never see a half-written document.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &self.path).await?;
        log::debug!("dashboard stats written to {}", self.path.display());
        Ok(stats)
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.lock.write().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatsSnapshot;
    use chrono::{Duration, Utc};

    fn stats(total_orders: u64) -> DashboardStats {
        let mut snapshot = StatsSnapshot::default();
        snapshot.overview.total_orders = total_orders;
        DashboardStats::stamp(snapshot, Utc::now(), Duration::minutes(5)).unwrap()
    }

    #[tokio::test]
    async fn test_memory_store_single_slot() {
        let store = MemoryStatsStore::new();
        assert!(store.find_one().await.unwrap().is_none());

        store.upsert(stats(1)).await.unwrap();
        store.upsert(stats(2)).await.unwrap();
        let found = store.find_one().await.unwrap().unwrap();
        assert_eq!(found.overview.total_orders, 2);

        store.clear().await.unwrap();
        assert!(store.find_one().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStatsStore::new(dir.path().join("dashboard.json"));

        assert!(store.find_one().await.unwrap().is_none());
        let written = store.upsert(stats(9)).await.unwrap();
        assert_eq!(store.find_one().await.unwrap(), Some(written));

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.find_one().await.unwrap().is_none());
    }
}
