//! Store catalog refresh.
//!
//! Fetches a page of the store listing, enriches every entry with a detail
//! lookup and upserts the result into the store apps table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::try_join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::models::{AppDetail, CatalogEntry, CatalogListing, CatalogQuery};
use crate::services::store::CatalogStore;

/// Errors returned by catalog services.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Request(String),

    #[error("Invalid response from catalog service: {0}")]
    InvalidResponse(String),

    #[error("App not found in catalog: {0}")]
    AppNotFound(String),
}

/// External store catalog.
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// List up to `num` apps of a category and collection.
    async fn list(
        &self,
        category: &str,
        collection: &str,
        num: u32,
    ) -> Result<Vec<CatalogListing>, CatalogError>;

    /// Look up the details of one app.
    async fn app_detail(&self, app_id: &str) -> Result<AppDetail, CatalogError>;
}

/// Fetches one page of the catalog with details.
///
/// All detail lookups run concurrently and the first failure fails the page.
pub async fn fetch_catalog(
    catalog: &dyn CatalogService,
    query: &CatalogQuery,
) -> Result<Vec<CatalogEntry>, CatalogError> {
    let listings = catalog
        .list(&query.category, &query.collection, query.fetch_count())
        .await?;
    debug!(
        fetched = listings.len(),
        skip = query.skip,
        "Fetched catalog listing"
    );

    let lookups = listings
        .into_iter()
        .skip(query.skip as usize)
        .take(query.limit as usize)
        .enumerate()
        .map(|(index, listing)| async move {
            let detail = catalog.app_detail(&listing.app_id).await?;
            Ok::<_, CatalogError>(CatalogEntry::new(listing, detail, query, rank(index)))
        });

    try_join_all(lookups).await
}

/// One-based rank of the listing at `index`, saturating at `i32::MAX`.
fn rank(index: usize) -> i32 {
    i32::try_from(index).map_or(i32::MAX, |index| index.saturating_add(1))
}

/// Result of a catalog refresh.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummary {
    pub category: String,
    pub collection: String,
    /// Entries fetched and enriched.
    pub fetched: usize,
    /// Whether the datastore accepted the upsert.
    pub stored: bool,
}

/// Service refreshing the store apps table from the catalog.
#[derive(Clone)]
pub struct CatalogRefreshService {
    catalog: Arc<dyn CatalogService>,
    store: Arc<dyn CatalogStore>,
}

impl CatalogRefreshService {
    pub fn new(catalog: Arc<dyn CatalogService>, store: Arc<dyn CatalogStore>) -> Self {
        Self { catalog, store }
    }

    /// Refresh one catalog page.
    ///
    /// Catalog failures are returned; datastore failures are logged only.
    pub async fn refresh(&self, query: CatalogQuery) -> Result<RefreshSummary, CatalogError> {
        let entries = fetch_catalog(self.catalog.as_ref(), &query).await?;

        let stored = match self.store.upsert_store_apps(&entries).await {
            Ok(rows) => {
                info!(
                    category = %query.category,
                    collection = %query.collection,
                    rows = rows,
                    "Store apps refreshed"
                );
                metrics::counter!("store_apps_refreshed_total").increment(rows);
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to upsert store apps");
                false
            }
        };

        Ok(RefreshSummary {
            category: query.category,
            collection: query.collection,
            fetched: entries.len(),
            stored,
        })
    }
}

/// Mock catalog serving fixed listings for development and testing.
#[derive(Debug, Default)]
pub struct MockCatalogService {
    listings: Vec<CatalogListing>,
    details: HashMap<String, AppDetail>,
    failing_app: Option<String>,
    detail_delay: Option<Duration>,
    list_requests: Mutex<Vec<u32>>,
    detail_requests: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockCatalogService {
    pub fn new(listings: Vec<CatalogListing>) -> Self {
        Self {
            listings,
            ..Self::default()
        }
    }

    /// Use `detail` as the lookup result for `app_id`.
    pub fn with_detail(mut self, app_id: impl Into<String>, detail: AppDetail) -> Self {
        self.details.insert(app_id.into(), detail);
        self
    }

    /// Make the detail lookup of `app_id` fail.
    pub fn failing_on(mut self, app_id: impl Into<String>) -> Self {
        self.failing_app = Some(app_id.into());
        self
    }

    /// Delay every detail lookup by `delay`.
    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = Some(delay);
        self
    }

    /// The `num` argument of every list call.
    pub fn list_requests(&self) -> Vec<u32> {
        self.list_requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn detail_requests(&self) -> usize {
        self.detail_requests.load(Ordering::SeqCst)
    }

    /// Highest number of detail lookups observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CatalogService for MockCatalogService {
    async fn list(
        &self,
        _category: &str,
        _collection: &str,
        num: u32,
    ) -> Result<Vec<CatalogListing>, CatalogError> {
        if let Ok(mut requests) = self.list_requests.lock() {
            requests.push(num);
        }
        Ok(self.listings.iter().take(num as usize).cloned().collect())
    }

    async fn app_detail(&self, app_id: &str) -> Result<AppDetail, CatalogError> {
        self.detail_requests.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        match self.detail_delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing_app.as_deref() == Some(app_id) {
            return Err(CatalogError::Request(format!("lookup of {} failed", app_id)));
        }
        Ok(self.details.get(app_id).cloned().unwrap_or_default())
    }
}
