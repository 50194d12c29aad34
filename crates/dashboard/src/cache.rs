//! Read-through cache over the dashboard document

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

use crate::model::{DashboardStats, StatsSnapshot};
use crate::store::StatsStore;
use crate::Result;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now = *now + by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|p| p.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Computes the statistics the cache serves
#[async_trait]
pub trait StatsAggregator: Send + Sync {
    async fn aggregate(&self) -> Result<StatsSnapshot>;
}

/// Where the cached document stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Fresh,
    Stale,
}

/// キャッシュオプション
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub ttl: Duration,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(5),
        }
    }
}

impl DashboardOptions {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Serves the dashboard document while it is fresh
pub struct DashboardCache<S: StatsStore> {
    store: S,
    clock: Arc<dyn Clock>,
    options: DashboardOptions,
}

impl<S: StatsStore> DashboardCache<S> {
    pub fn new(store: S, options: DashboardOptions) -> Self {
        Self::with_clock(store, options, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, options: DashboardOptions, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The cached document if still fresh; `None` means recompute
    pub async fn get_dashboard_stats(&self) -> Result<Option<DashboardStats>> {
        let now = self.clock.now();
        Ok(self.store.find_one().await?.filter(|stats| stats.is_fresh_at(now)))
    }

    /// The cached document regardless of age
    pub async fn peek(&self) -> Result<Option<DashboardStats>> {
        self.store.find_one().await
    }

    pub async fn state(&self) -> Result<CacheState> {
        let now = self.clock.now();
        Ok(match self.store.find_one().await? {
            None => CacheState::Empty,
            Some(stats) if stats.is_fresh_at(now) => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        })
    }

    /// Store a new snapshot, stamping `last_updated` with the current time
    pub async fn update_dashboard_stats(&self, snapshot: StatsSnapshot) -> Result<DashboardStats> {
        let stats = DashboardStats::stamp(snapshot, self.clock.now(), self.options.ttl)?;
        self.store.upsert(stats).await
    }

    /// Serve fresh stats, recomputing through `aggregator` when empty or stale.
    ///
    /// If recomputation fails and an older document exists, the older
    /// document is returned instead of the error.
    pub async fn get_or_refresh(&self, aggregator: &dyn StatsAggregator) -> Result<DashboardStats> {
        let now = self.clock.now();
        let cached = self.store.find_one().await?;
        if let Some(stats) = &cached {
            if stats.is_fresh_at(now) {
                return Ok(stats.clone());
            }
        }

        match aggregator.aggregate().await {
            Ok(snapshot) => self.update_dashboard_stats(snapshot).await,
            Err(e) => match cached {
                Some(stale) => {
                    log::warn!(
                        "dashboard aggregation failed, serving stats from {}: {}",
                        stale.last_updated,
                        e
                    );
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }

    /// Forget the cached document
    pub async fn invalidate(&self) -> Result<()> {
        self.store.clear().await
    }
}
