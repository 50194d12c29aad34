//! Storefront dashboard cache for Rust
//!
//! This crate holds the precomputed admin dashboard statistics: a single
//! document with a time-to-live, refreshed by an external aggregator.

mod cache;
mod model;
mod store;

use thiserror::Error;

pub use cache::*;
pub use model::*;
pub use store::*;

/// 結果型
pub type Result<T> = std::result::Result<T, DashboardError>;

/// エラー型
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Aggregation error: {0}")]
    Aggregation(String),

    #[error("Invalid cache expiry: {0}")]
    InvalidExpiry(String),
}

impl DashboardError {
    pub fn aggregation<T: std::fmt::Display>(msg: T) -> Self {
        Self::Aggregation(msg.to_string())
    }
}
