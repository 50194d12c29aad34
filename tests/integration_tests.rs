use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use storefront_rust::auth::{MemorySessionStore, SessionStore, USER_TOKEN_KEY};
use storefront_rust::config::ClientOptions;
use storefront_rust::dashboard::{MemoryStatsStore, StatsAggregator, StatsSnapshot};
use storefront_rust::prelude::*;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct FixedAggregator;

#[async_trait]
impl StatsAggregator for FixedAggregator {
    async fn aggregate(&self) -> storefront_rust::dashboard::Result<StatsSnapshot> {
        let mut snapshot = StatsSnapshot::default();
        snapshot.overview.total_products = 3;
        snapshot.overview.total_revenue = 249.5;
        Ok(snapshot)
    }
}

#[test]
fn test_rejects_invalid_base_url() {
    assert!(matches!(Storefront::new("not a url"), Err(Error::Url(_))));
    assert!(matches!(
        Storefront::new("mailto:admin@example.com"),
        Err(Error::General(_))
    ));
}

#[tokio::test]
async fn test_category_flow_through_facade() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/categories"))
        .and(header("Authorization", "Bearer admin-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "categories": [
                { "_id": "c1", "name": "Shoes", "slug": "shoes", "parent": null },
                { "_id": "c2", "name": "Boots", "slug": "boots", "parent": "c1" }
            ]
        })))
        .mount(&server)
        .await;

    let storefront = Storefront::new(&format!("{}/api", server.uri())).unwrap();
    storefront.sign_in_admin("admin-123");

    let store = storefront.categories();
    assert!(store.fetch_categories(FetchOptions::new()).await);

    let state = store.snapshot();
    assert_eq!(state.categories().len(), 1);
    assert_eq!(state.categories()[0].children.len(), 1);

    storefront.sign_out();
    assert!(!store.fetch_categories(FetchOptions::new()).await);
    assert_eq!(state.flat, store.snapshot().flat);
}

#[tokio::test]
async fn test_user_token_fallback_and_custom_path() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v2/categories/c1"))
        .and(header("Authorization", "Bearer shopper"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "Admin access required" })))
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(MemorySessionStore::new());
    session.set(USER_TOKEN_KEY, "shopper");
    let options = ClientOptions::default().with_categories_path("/v2/categories/");
    let storefront = Storefront::new_with_options(&server.uri(), session, options).unwrap();

    let store = storefront.categories();
    assert!(!store.delete_category("c1", &|_: &str| true).await);
    assert_eq!(store.snapshot().error.as_deref(), Some("Admin access required"));
}

#[tokio::test]
async fn test_dashboard_cache_from_facade() {
    let storefront = Storefront::new("https://shop.example.com").unwrap();
    let cache = storefront.dashboard_cache(MemoryStatsStore::new());

    assert!(cache.get_dashboard_stats().await.unwrap().is_none());
    let stats = cache.get_or_refresh(&FixedAggregator).await.unwrap();
    assert_eq!(stats.overview.total_products, 3);
    assert_eq!(
        cache.get_dashboard_stats().await.unwrap().map(|s| s.overview.total_revenue),
        Some(249.5)
    );
}

#[test]
fn test_reset_token_errors_map_to_messages() {
    let storefront = Storefront::new("https://shop.example.com").unwrap();
    let token = storefront
        .reset_tokens()
        .issue("shopper@example.com", "u-1")
        .unwrap();

    let err: Error = storefront
        .reset_tokens()
        .verify("shopper@example.com", "wrong")
        .unwrap_err()
        .into();
    assert_eq!(err.user_message(), "This reset link is invalid.");

    assert!(storefront
        .reset_tokens()
        .consume("shopper@example.com", &token.reset_token)
        .is_ok());
}
