//! HTTP client for `/admin/categories`

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use storefront_auth::TokenProvider;
use url::Url;

use crate::fetch::FetchBuilder;
use crate::model::{
    Category, CategoryForm, CategoryListResponse, CategoryListing, FetchOptions,
};
use crate::tree::{build_category_tree, flatten_tree};
use crate::{CategoryError, Result};

/// クライアントオプション
#[derive(Debug, Clone)]
pub struct CategoryOptions {
    /// Path of the category resource below the API base URL
    pub resource_path: String,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
    /// How long a success message stays visible
    pub success_message_ttl: Duration,
}

impl Default for CategoryOptions {
    fn default() -> Self {
        Self {
            resource_path: "admin/categories".to_string(),
            request_timeout: Some(Duration::from_secs(30)),
            success_message_ttl: Duration::from_secs(3),
        }
    }
}

impl CategoryOptions {
    pub fn with_resource_path(mut self, path: &str) -> Self {
        self.resource_path = path.trim_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_success_message_ttl(mut self, ttl: Duration) -> Self {
        self.success_message_ttl = ttl;
        self
    }
}

/// Stateless client for the category endpoints
#[derive(Clone)]
pub struct CategoryClient {
    base_url: String,
    http_client: Client,
    tokens: Arc<dyn TokenProvider>,
    options: CategoryOptions,
}

impl CategoryClient {
    pub fn new(
        base_url: &str,
        http_client: Client,
        tokens: Arc<dyn TokenProvider>,
        options: CategoryOptions,
    ) -> Self {
        Self {
            base_url: base_url.to_string(),
            http_client,
            tokens,
            options,
        }
    }

    pub fn options(&self) -> &CategoryOptions {
        &self.options
    }

    fn endpoint(&self, id: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| CategoryError::UrlParse(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            segments.pop_if_empty();
            for segment in self.options.resource_path.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn bearer(&self) -> Result<String> {
        self.tokens.require_token().map_err(|_| CategoryError::AuthMissing)
    }

    /// `GET /admin/categories`, returning both the tree and the flat list
    pub async fn list(&self, opts: &FetchOptions) -> Result<CategoryListing> {
        let token = self.bearer()?;
        let response: CategoryListResponse = FetchBuilder::get(&self.http_client, self.endpoint(None)?)
            .bearer_auth(&token)
            .query(opts.query_pairs())
            .timeout(self.options.request_timeout)
            .execute()
            .await?;

        let listing = if opts.hierarchy {
            let flat = match response.flat {
                Some(flat) => flat,
                None => flatten_tree(&response.categories),
            };
            CategoryListing {
                tree: response.categories,
                flat,
            }
        } else {
            let flat: Vec<Category> = response
                .categories
                .into_iter()
                .map(|node| node.category)
                .collect();
            CategoryListing {
                tree: build_category_tree(&flat, None)?,
                flat,
            }
        };

        log::debug!("fetched {} categories", listing.flat.len());
        Ok(listing)
    }

    /// `POST /admin/categories`
    pub async fn create(&self, form: &CategoryForm) -> Result<String> {
        let token = self.bearer()?;
        FetchBuilder::post(&self.http_client, self.endpoint(None)?)
            .bearer_auth(&token)
            .timeout(self.options.request_timeout)
            .json(form)?
            .execute_message("Category created successfully")
            .await
    }

    /// `PUT /admin/categories/:id`
    pub async fn update(&self, id: &str, form: &CategoryForm) -> Result<String> {
        let token = self.bearer()?;
        FetchBuilder::put(&self.http_client, self.endpoint(Some(id))?)
            .bearer_auth(&token)
            .timeout(self.options.request_timeout)
            .json(form)?
            .execute_message("Category updated successfully")
            .await
    }

    /// `DELETE /admin/categories/:id`
    pub async fn delete(&self, id: &str) -> Result<String> {
        let token = self.bearer()?;
        FetchBuilder::delete(&self.http_client, self.endpoint(Some(id))?)
            .bearer_auth(&token)
            .timeout(self.options.request_timeout)
            .execute_message("Category deleted successfully")
            .await
    }
}
