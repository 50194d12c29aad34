//! Dashboard statistics documents

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{DashboardError, Result};

/// Default freshness window, in seconds
pub const DEFAULT_CACHE_EXPIRY_SECS: i64 = 300;

fn default_cache_expiry() -> i64 {
    DEFAULT_CACHE_EXPIRY_SECS
}

/// Headline counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_products: u64,
    pub active_products: u64,
    pub total_users: u64,
    pub total_orders: u64,
    pub total_revenue: f64,
    pub low_stock_products: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrder {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub total_amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopRatedProduct {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    pub rating: f64,
    #[serde(default)]
    pub num_reviews: u32,
}

/// Freshly aggregated numbers, before they are stamped and cached
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub overview: Overview,
    #[serde(default)]
    pub recent_orders: Vec<RecentOrder>,
    #[serde(default)]
    pub top_rated_products: Vec<TopRatedProduct>,
}

/// The single cached dashboard document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub overview: Overview,
    #[serde(default)]
    pub recent_orders: Vec<RecentOrder>,
    #[serde(default)]
    pub top_rated_products: Vec<TopRatedProduct>,
    pub last_updated: DateTime<Utc>,
    /// Freshness window in seconds
    #[serde(default = "default_cache_expiry")]
    pub cache_expiry: i64,
}

impl DashboardStats {
    /// Stamp a snapshot taken at `now`.
    ///
    /// `cacheExpiry` is stored in whole seconds, so `expiry` must be at least
    /// one second and carry no fractional part.
    pub fn stamp(snapshot: StatsSnapshot, now: DateTime<Utc>, expiry: Duration) -> Result<Self> {
        let secs = expiry.num_seconds();
        if secs < 1 || Duration::try_seconds(secs) != Some(expiry) {
            return Err(DashboardError::InvalidExpiry(format!(
                "{}ms is not a whole number of seconds",
                expiry.num_milliseconds()
            )));
        }
        Ok(Self {
            overview: snapshot.overview,
            recent_orders: snapshot.recent_orders,
            top_rated_products: snapshot.top_rated_products,
            last_updated: now,
            cache_expiry: secs,
        })
    }

    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_updated
    }

    /// Fresh while `now - last_updated` has not exceeded the expiry.
    ///
    /// A negative or out-of-range `cacheExpiry` counts as stale.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        if self.cache_expiry < 0 {
            return false;
        }
        match Duration::try_seconds(self.cache_expiry) {
            Some(expiry) => self.age_at(now) <= expiry,
            None => {
                log::warn!("cacheExpiry {} out of range, treating as stale", self.cache_expiry);
                false
            }
        }
    }
}
