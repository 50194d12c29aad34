use async_trait::async_trait;
use dotenv::dotenv;
use std::env;
use storefront_rust::dashboard::{
    DashboardError, FileStatsStore, Overview, StatsAggregator, StatsSnapshot,
};
use storefront_rust::prelude::*;

/// Stands in for the backend aggregation pipeline
struct SampleAggregator;

#[async_trait]
impl StatsAggregator for SampleAggregator {
    async fn aggregate(&self) -> Result<StatsSnapshot, DashboardError> {
        log::info!("recomputing dashboard statistics");
        Ok(StatsSnapshot {
            overview: Overview {
                total_products: 128,
                active_products: 117,
                total_users: 2_048,
                total_orders: 5_311,
                total_revenue: 412_930.75,
                low_stock_products: 9,
            },
            recent_orders: Vec::new(),
            top_rated_products: Vec::new(),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let cache_path =
        env::var("STOREFRONT_DASHBOARD_CACHE").unwrap_or_else(|_| "dashboard-cache.json".to_string());
    let api_url = env::var("STOREFRONT_API_URL").unwrap_or_else(|_| "http://localhost:5000/api".to_string());

    let storefront = Storefront::new(&api_url)?;
    let cache = storefront.dashboard_cache(FileStatsStore::new(&cache_path));

    println!("Cache state before: {:?}", cache.state().await?);
    match cache.get_dashboard_stats().await? {
        Some(stats) => println!("Serving cached stats from {}", stats.last_updated),
        None => println!("No fresh stats, recomputing"),
    }

    let stats = cache.get_or_refresh(&SampleAggregator).await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    println!("Cache state after: {:?}", cache.state().await?);

    Ok(())
}
