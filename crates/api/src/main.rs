use std::sync::Arc;

use anyhow::Result;
use persistence::repositories::NotificationRepository;
use persistence::PgStore;
use tracing::info;

use appstats_api::app::{create_app, AppPorts};
use appstats_api::config::Config;
use appstats_api::middleware::{init_metrics, logging::init_logging};
use appstats_api::services::{EventNotificationDispatcher, HttpCatalogClient, LogSnagTracker};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging);
    init_metrics()?;

    info!("Starting App Stats API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&(&config.database).into()).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    let store = Arc::new(PgStore::new(pool.clone()));
    let notification_log = Arc::new(NotificationRepository::new(pool));

    let ports = AppPorts {
        stats_store: store.clone(),
        catalog_store: store,
        catalog: Arc::new(HttpCatalogClient::new(&config.catalog)?),
        notifier: Arc::new(EventNotificationDispatcher::new(
            notification_log,
            &config.notifications,
        )?),
        tracker: Arc::new(LogSnagTracker::new(&config.analytics)?),
    };

    let addr = config.socket_addr()?;
    let app = create_app(config, ports);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
