//! Storefront category client for Rust
//!
//! This crate provides the admin category-management data flow:
//! listing, creating, editing and deleting categories through the REST API,
//! deriving the category tree, and the form state of the editor.
//!
//! # Features
//!
//! - `CategoryClient` for `/admin/categories`
//! - `CategoryStore` that keeps a typed `CategoryState` in sync
//! - `build_category_tree` with parent cycle detection
//! - `generate_slug` for URL slugs

mod client;
mod fetch;
mod form;
mod model;
mod slug;
mod state;
mod store;
mod tree;

use reqwest::StatusCode;
use thiserror::Error;

pub use client::*;
pub use fetch::FetchBuilder;
pub use form::*;
pub use model::{
    Category, CategoryForm, CategoryListing, CategoryNode, FetchOptions, ParentRef, ParentSummary,
};
pub use slug::*;
pub use state::*;
pub use store::*;
pub use tree::*;

/// 結果型
pub type Result<T> = std::result::Result<T, CategoryError>;

/// エラー型
#[derive(Error, Debug)]
pub enum CategoryError {
    #[error("Authentication required")]
    AuthMissing,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {message} (Status: {status})")]
    Server { status: StatusCode, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid category: {0}")]
    InvalidForm(String),

    #[error("Category {id} cannot be placed under {parent}")]
    Cycle { id: String, parent: String },

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("Another category change is still in progress")]
    Busy,

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CategoryError {
    /// Text suitable for showing to the admin user
    pub fn user_message(&self) -> String {
        match self {
            CategoryError::AuthMissing => {
                "You must be logged in as an admin to manage categories.".to_string()
            }
            CategoryError::Network(e) if e.is_timeout() => {
                "The server took too long to respond. Please try again.".to_string()
            }
            CategoryError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            CategoryError::Server { message, .. } => message.clone(),
            CategoryError::MalformedResponse(_) => {
                "The server sent an unexpected response. Please try again.".to_string()
            }
            CategoryError::InvalidForm(message) => message.clone(),
            CategoryError::Cycle { .. } => {
                "A category cannot be moved under itself or one of its subcategories.".to_string()
            }
            CategoryError::Tree(e) => format!("Category data is inconsistent: {}", e),
            CategoryError::Busy => {
                "Please wait for the current change to finish.".to_string()
            }
            CategoryError::UrlParse(_) | CategoryError::Serialization(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }

    /// HTTP status for server-side failures
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CategoryError::Server { status, .. } => Some(*status),
            CategoryError::Network(e) => e.status(),
            _ => None,
        }
    }
}
