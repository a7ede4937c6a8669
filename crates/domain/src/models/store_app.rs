//! Store catalog models.

use serde::{Deserialize, Serialize};

/// Catalog category used when a refresh does not name one.
pub const DEFAULT_CATEGORY: &str = "APPLICATION";

/// Catalog collection used when a refresh does not name one.
pub const DEFAULT_COLLECTION: &str = "TOP_FREE";

/// Number of entries kept per refresh by default.
pub const DEFAULT_LIMIT: u32 = 1000;

/// Number of leading entries skipped per refresh by default.
pub const DEFAULT_SKIP: u32 = 0;

/// Entry of a catalog listing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogListing {
    pub app_id: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub developer: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub free: bool,
}

/// Fields only available from the per-app detail lookup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDetail {
    #[serde(default)]
    pub developer_email: Option<String>,
    #[serde(default)]
    pub max_installs: Option<i64>,
}

/// Store app row produced by a catalog refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub url: String,
    pub app_id: String,
    pub title: String,
    pub summary: Option<String>,
    pub developer: Option<String>,
    pub developer_email: Option<String>,
    pub icon: Option<String>,
    pub score: Option<f64>,
    pub free: bool,
    pub category: String,
    pub collection: String,
    /// 1-based position in the refreshed page.
    pub rank: i32,
    pub installs: Option<i64>,
}

impl CatalogEntry {
    pub fn new(listing: CatalogListing, detail: AppDetail, query: &CatalogQuery, rank: i32) -> Self {
        Self {
            url: listing.url,
            app_id: listing.app_id,
            title: listing.title,
            summary: listing.summary,
            developer: listing.developer,
            developer_email: detail.developer_email,
            icon: listing.icon,
            score: listing.score,
            free: listing.free,
            category: query.category.clone(),
            collection: query.collection.clone(),
            rank,
            installs: detail.max_installs,
        }
    }
}

/// Refresh parameters as received over HTTP.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshCatalogRequest {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub skip: Option<u32>,
}

/// Refresh parameters with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub category: String,
    pub collection: String,
    pub limit: u32,
    pub skip: u32,
}

impl CatalogQuery {
    /// Number of listing entries to request so that `limit` remain after skipping.
    pub fn fetch_count(&self) -> u32 {
        self.limit.saturating_add(self.skip)
    }
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            limit: DEFAULT_LIMIT,
            skip: DEFAULT_SKIP,
        }
    }
}

impl From<RefreshCatalogRequest> for CatalogQuery {
    fn from(request: RefreshCatalogRequest) -> Self {
        let defaults = CatalogQuery::default();
        Self {
            category: request
                .category
                .filter(|c| !c.is_empty())
                .unwrap_or(defaults.category),
            collection: request
                .collection
                .filter(|c| !c.is_empty())
                .unwrap_or(defaults.collection),
            limit: request.limit.unwrap_or(defaults.limit),
            skip: request.skip.unwrap_or(defaults.skip),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_query_defaults() {
        let query = CatalogQuery::from(RefreshCatalogRequest::default());
        assert_eq!(query.category, "APPLICATION");
        assert_eq!(query.collection, "TOP_FREE");
        assert_eq!(query.limit, 1000);
        assert_eq!(query.skip, 0);
        assert_eq!(query.fetch_count(), 1000);
    }

    #[test]
    fn test_catalog_query_overrides() {
        let query = CatalogQuery::from(RefreshCatalogRequest {
            category: Some("GAME".to_string()),
            collection: Some(String::new()),
            limit: Some(10),
            skip: Some(5),
        });
        assert_eq!(query.category, "GAME");
        assert_eq!(query.collection, DEFAULT_COLLECTION);
        assert_eq!(query.fetch_count(), 15);
    }

    #[test]
    fn test_catalog_entry_serializes_camel_case() {
        let listing = CatalogListing {
            app_id: "com.example.app".to_string(),
            url: "https://play.google.com/store/apps/details?id=com.example.app".to_string(),
            title: "Example".to_string(),
            summary: None,
            developer: Some("Example Inc".to_string()),
            icon: None,
            score: Some(4.5),
            free: true,
        };
        let detail = AppDetail {
            developer_email: Some("dev@example.com".to_string()),
            max_installs: Some(1_000_000),
        };
        let entry = CatalogEntry::new(listing, detail, &CatalogQuery::default(), 3);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["appId"], "com.example.app");
        assert_eq!(json["developerEmail"], "dev@example.com");
        assert_eq!(json["installs"], 1_000_000);
        assert_eq!(json["rank"], 3);
    }
}
