use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use domain::services::{
    CatalogRefreshService, CatalogService, CatalogStore, EventTracker, NotificationDispatcher,
    StatsIngestionService, StatsStore,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::panic::panic_response;
use crate::routes::{health, stats, store_apps};

/// Adapters the application runs against.
#[derive(Clone)]
pub struct AppPorts {
    pub stats_store: Arc<dyn StatsStore>,
    pub catalog_store: Arc<dyn CatalogStore>,
    pub catalog: Arc<dyn CatalogService>,
    pub notifier: Arc<dyn NotificationDispatcher>,
    pub tracker: Arc<dyn EventTracker>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stats: Arc<StatsIngestionService>,
    pub catalog: Arc<CatalogRefreshService>,
    pub store: Arc<dyn StatsStore>,
}

pub fn create_app(config: Config, ports: AppPorts) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        config: config.clone(),
        stats: Arc::new(StatsIngestionService::new(
            ports.stats_store.clone(),
            ports.notifier,
            ports.tracker,
        )),
        catalog: Arc::new(CatalogRefreshService::new(
            ports.catalog,
            ports.catalog_store,
        )),
        store: ports.stats_store,
    };

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);

    // Device-facing ingestion
    let stats_routes = Router::new()
        .route(
            "/stats",
            get(stats::record_stats)
                .post(stats::record_stats)
                .put(stats::record_stats)
                .patch(stats::record_stats),
        )
        .route_layer(TimeoutLayer::new(request_timeout));

    // Catalog maintenance runs until every detail lookup settles
    let catalog_routes = Router::new().route(
        "/store-apps/refresh",
        get(store_apps::refresh_store_apps)
            .post(store_apps::refresh_store_apps)
            .put(store_apps::refresh_store_apps)
            .patch(store_apps::refresh_store_apps),
    );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route_layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .merge(public_routes)
        .merge(stats_routes)
        .merge(catalog_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
