//! Integration tests for the store catalog refresh endpoint.
//!
//! Run with: cargo test --test store_apps_integration

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use domain::models::{AppDetail, CatalogListing};
use domain::services::{
    InMemoryStore, MockCatalogService, MockEventTracker, MockNotificationDispatcher,
};
use serde_json::json;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn listing(i: usize) -> CatalogListing {
    CatalogListing {
        app_id: format!("com.store.app{}", i),
        url: format!("https://play.google.com/store/apps/details?id=com.store.app{}", i),
        title: format!("Store App {}", i),
        summary: Some("A store app".to_string()),
        developer: Some("Store Dev".to_string()),
        icon: None,
        score: Some(4.5),
        free: true,
    }
}

fn catalog(n: usize) -> MockCatalogService {
    MockCatalogService::new((0..n).map(listing).collect())
}

fn app_with(store: InMemoryStore, catalog: MockCatalogService) -> TestApp {
    TestApp::with_fakes(
        store,
        catalog,
        MockNotificationDispatcher::new(),
        MockEventTracker::new(),
    )
}

#[tokio::test]
async fn test_refresh_applies_skip_and_limit() {
    let app = app_with(InMemoryStore::new(), catalog(30));

    let (status, response) = app
        .json(
            Method::POST,
            "/store-apps/refresh",
            json!({"category": "GAME", "collection": "TOP_PAID", "limit": 10, "skip": 5}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["category"], "GAME");
    assert_eq!(response["collection"], "TOP_PAID");
    assert_eq!(response["fetched"], 10);
    assert_eq!(response["stored"], true);

    assert_eq!(app.catalog.list_requests(), vec![15]);
    assert_eq!(app.catalog.detail_requests(), 10);

    let stored = app.store.store_apps();
    assert_eq!(stored.len(), 10);
    assert!(!stored.contains_key("com.store.app4"));
    assert_eq!(stored["com.store.app5"].rank, 1);
    assert_eq!(stored["com.store.app14"].rank, 10);
}

#[tokio::test]
async fn test_refresh_get_uses_defaults() {
    let app = app_with(InMemoryStore::new(), catalog(3));

    let (status, response) = app.get("/store-apps/refresh").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["category"], "APPLICATION");
    assert_eq!(response["collection"], "TOP_FREE");
    assert_eq!(app.catalog.list_requests(), vec![1000]);
    assert_eq!(app.store.store_apps().len(), 3);
}

#[tokio::test]
async fn test_refresh_empty_post_body_uses_defaults() {
    let app = app_with(InMemoryStore::new(), catalog(2));
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/store-apps/refresh")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, response) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["fetched"], 2);
}

#[tokio::test]
async fn test_refresh_merges_detail_fields() {
    let catalog = catalog(1).with_detail(
        "com.store.app0",
        AppDetail {
            developer_email: Some("dev@store.example".to_string()),
            max_installs: Some(50_000),
        },
    );
    let app = app_with(InMemoryStore::new(), catalog);

    let (status, _) = app.get("/store-apps/refresh?limit=1").await;

    assert_eq!(status, StatusCode::OK);
    let entry = &app.store.store_apps()["com.store.app0"];
    assert_eq!(entry.developer_email.as_deref(), Some("dev@store.example"));
    assert_eq!(entry.installs, Some(50_000));
}

#[tokio::test]
async fn test_refresh_detail_failure_skips_upsert() {
    let app = app_with(
        InMemoryStore::new(),
        catalog(5).failing_on("com.store.app2"),
    );

    let (status, response) = app.get("/store-apps/refresh?limit=5").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response["message"]
        .as_str()
        .unwrap()
        .contains("com.store.app2"));
    assert!(app.store.store_apps().is_empty());
    assert!(app.store.calls().is_empty());
}

#[tokio::test]
async fn test_refresh_store_failure_is_reported_not_raised() {
    let app = app_with(InMemoryStore::failing_writes(), catalog(3));

    let (status, response) = app.get("/store-apps/refresh").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["fetched"], 3);
    assert_eq!(response["stored"], false);
}

#[tokio::test]
async fn test_refresh_outlives_request_timeout() {
    let mut config = common::test_config();
    config.server.request_timeout_secs = 1;
    let app = TestApp::with_config(
        config,
        InMemoryStore::new(),
        catalog(3).with_detail_delay(Duration::from_millis(1500)),
        MockNotificationDispatcher::new(),
        MockEventTracker::new(),
    );

    let (status, response) = app.get("/store-apps/refresh?limit=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["fetched"], 3);
    assert_eq!(app.store.store_apps().len(), 3);
}

#[tokio::test]
async fn test_refresh_rejects_bad_parameters() {
    let app = app_with(InMemoryStore::new(), catalog(3));

    let (status, _) = app.get("/store-apps/refresh?limit=lots").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.catalog.list_requests().is_empty());
}

#[tokio::test]
async fn test_fetch_catalog_runs_lookups_concurrently() {
    let catalog = catalog(8);
    let query = domain::models::CatalogQuery {
        limit: 8,
        ..Default::default()
    };

    let entries = assert_ok!(domain::services::fetch_catalog(&catalog, &query).await);
    assert_eq!(entries.len(), 8);
    assert_eq!(catalog.max_in_flight(), 8);

    let failing = MockCatalogService::new(vec![listing(0)]).failing_on("com.store.app0");
    assert_err!(domain::services::fetch_catalog(&failing, &query).await);
}
