//! Configuration options for the storefront client

use std::time::Duration;

use storefront_auth::{ResetTokenOptions, ADMIN_TOKEN_KEY, USER_TOKEN_KEY};
use storefront_categories::CategoryOptions;
use storefront_dashboard::DashboardOptions;

/// Configuration options for the storefront client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// How long a success message stays visible
    pub success_message_ttl: Duration,

    /// Path of the admin category resource
    pub categories_path: String,

    /// Session keys searched for the bearer token, in order
    pub token_keys: Vec<String>,

    /// How long the dashboard document counts as fresh
    pub dashboard_ttl: chrono::Duration,

    /// How long a password reset token stays valid
    pub reset_token_lifetime: chrono::Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            success_message_ttl: Duration::from_secs(3),
            categories_path: "admin/categories".to_string(),
            token_keys: vec![ADMIN_TOKEN_KEY.to_string(), USER_TOKEN_KEY.to_string()],
            dashboard_ttl: chrono::Duration::minutes(5),
            reset_token_lifetime: chrono::Duration::hours(1),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set how long success messages stay visible
    pub fn with_success_message_ttl(mut self, value: Duration) -> Self {
        self.success_message_ttl = value;
        self
    }

    /// Set the category resource path
    pub fn with_categories_path(mut self, value: &str) -> Self {
        self.categories_path = value.trim_matches('/').to_string();
        self
    }

    /// Set the session keys searched for a token
    pub fn with_token_keys(mut self, keys: &[&str]) -> Self {
        self.token_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Set the dashboard cache TTL
    pub fn with_dashboard_ttl(mut self, value: chrono::Duration) -> Self {
        self.dashboard_ttl = value;
        self
    }

    /// Set the reset token lifetime
    pub fn with_reset_token_lifetime(mut self, value: chrono::Duration) -> Self {
        self.reset_token_lifetime = value;
        self
    }

    pub fn category_options(&self) -> CategoryOptions {
        CategoryOptions::default()
            .with_resource_path(&self.categories_path)
            .with_request_timeout(self.request_timeout)
            .with_success_message_ttl(self.success_message_ttl)
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions::default().with_ttl(self.dashboard_ttl)
    }

    pub fn reset_token_options(&self) -> ResetTokenOptions {
        ResetTokenOptions::default().with_lifetime(self.reset_token_lifetime)
    }
}
