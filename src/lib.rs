//! Storefront Rust Client Library
//!
//! A Rust client library for the storefront admin console, providing the
//! category management data flow, the dashboard statistics cache and
//! password reset tokens.

pub mod config;
pub mod error;

pub use storefront_auth as auth;
pub use storefront_categories as categories;
pub use storefront_dashboard as dashboard;

use reqwest::Client;
use std::sync::Arc;
use url::Url;

use crate::auth::{
    MemorySessionStore, ResetTokenStore, SessionStore, StoredToken, ADMIN_TOKEN_KEY,
};
use crate::categories::{CategoryClient, CategoryStore};
use crate::config::ClientOptions;
use crate::dashboard::{DashboardCache, StatsStore};
use crate::error::Error;

/// The main entry point for the storefront client
pub struct Storefront {
    /// The base URL of the storefront API
    pub url: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Client options
    pub options: ClientOptions,
    session: Arc<dyn SessionStore>,
    reset_tokens: Arc<ResetTokenStore>,
}

impl Storefront {
    /// Create a new storefront client with an in-memory session
    ///
    /// # Example
    ///
    /// ```
    /// use storefront_rust::Storefront;
    ///
    /// let storefront = Storefront::new("https://shop.example.com/api").unwrap();
    /// ```
    pub fn new(api_url: &str) -> Result<Self, Error> {
        Self::new_with_options(
            api_url,
            Arc::new(MemorySessionStore::new()),
            ClientOptions::default(),
        )
    }

    /// Create a new storefront client with a custom session store and options
    pub fn new_with_options(
        api_url: &str,
        session: Arc<dyn SessionStore>,
        options: ClientOptions,
    ) -> Result<Self, Error> {
        let parsed = Url::parse(api_url)?;
        if parsed.cannot_be_a_base() {
            return Err(Error::general(format!("not an HTTP base URL: {}", api_url)));
        }

        let reset_tokens = Arc::new(ResetTokenStore::new(options.reset_token_options()));

        Ok(Self {
            url: api_url.to_string(),
            http_client: Client::new(),
            options,
            session,
            reset_tokens,
        })
    }

    /// The session store holding the bearer token
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Remember the admin token for subsequent requests
    pub fn sign_in_admin(&self, token: &str) {
        self.session.set(ADMIN_TOKEN_KEY, token);
    }

    /// Forget every stored token
    pub fn sign_out(&self) {
        for key in &self.options.token_keys {
            self.session.remove(key);
        }
    }

    /// Create a category store bound to this client's session
    ///
    /// Each call starts with empty state; keep the returned store around.
    pub fn categories(&self) -> CategoryStore {
        let keys: Vec<&str> = self.options.token_keys.iter().map(String::as_str).collect();
        let tokens = StoredToken::new(self.session.clone()).with_keys(&keys);
        let client = CategoryClient::new(
            &self.url,
            self.http_client.clone(),
            Arc::new(tokens),
            self.options.category_options(),
        );
        CategoryStore::new(client)
    }

    /// Wrap a stats store in a dashboard cache using the configured TTL
    pub fn dashboard_cache<S: StatsStore>(&self, store: S) -> DashboardCache<S> {
        DashboardCache::new(store, self.options.dashboard_options())
    }

    /// Password reset tokens issued by this client
    pub fn reset_tokens(&self) -> &Arc<ResetTokenStore> {
        &self.reset_tokens
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::categories::{
        build_category_tree, generate_slug, Category, CategoryForm, CategoryStore, FetchOptions,
    };
    pub use crate::config::ClientOptions;
    pub use crate::dashboard::{DashboardCache, DashboardStats, MemoryStatsStore};
    pub use crate::error::Error;
    pub use crate::Storefront;
}
