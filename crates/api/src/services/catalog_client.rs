//! HTTP client for the app store scraper service.
//!
//! The scraper exposes `GET /list?category=&collection=&num=` returning an
//! array of listings and `GET /apps/{app_id}` returning one app's details.

use std::time::Duration;

use async_trait::async_trait;
use domain::models::{AppDetail, CatalogListing};
use domain::services::{CatalogError, CatalogService};
use reqwest::{Client, StatusCode, Url};

use crate::config::CatalogConfig;

/// Catalog service backed by the scraper's JSON API.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
}

impl HttpCatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn list_url(&self) -> String {
        format!("{}/list", self.base_url)
    }

    fn detail_url(&self, app_id: &str) -> String {
        format!("{}/apps/{}", self.base_url, app_id)
    }
}

/// Maps a non-success scraper status to a catalog error.
fn status_error(status: StatusCode, app_id: Option<&str>, body: String) -> CatalogError {
    match (status, app_id) {
        (StatusCode::NOT_FOUND, Some(app_id)) => CatalogError::AppNotFound(app_id.to_string()),
        _ => CatalogError::Request(format!("scraper returned {}: {}", status, body)),
    }
}

#[async_trait]
impl CatalogService for HttpCatalogClient {
    async fn list(
        &self,
        category: &str,
        collection: &str,
        num: u32,
    ) -> Result<Vec<CatalogListing>, CatalogError> {
        let num = num.to_string();
        let url = Url::parse_with_params(
            &self.list_url(),
            &[
                ("category", category),
                ("collection", collection),
                ("num", num.as_str()),
            ],
        )
        .map_err(|e| CatalogError::Request(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, None, body));
        }

        response
            .json::<Vec<CatalogListing>>()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))
    }

    async fn app_detail(&self, app_id: &str) -> Result<AppDetail, CatalogError> {
        let response = self
            .client
            .get(self.detail_url(app_id))
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, Some(app_id), body));
        }

        response
            .json::<AppDetail>()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> HttpCatalogClient {
        HttpCatalogClient::new(&CatalogConfig {
            base_url: base_url.to_string(),
            timeout_ms: 1000,
        })
        .unwrap()
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let client = client("http://scraper:3000/");
        assert_eq!(client.list_url(), "http://scraper:3000/list");
        assert_eq!(
            client.detail_url("com.example.app"),
            "http://scraper:3000/apps/com.example.app"
        );
    }

    #[test]
    fn test_status_error_not_found_detail() {
        let error = status_error(StatusCode::NOT_FOUND, Some("com.example.app"), String::new());
        assert!(matches!(error, CatalogError::AppNotFound(id) if id == "com.example.app"));
    }

    #[test]
    fn test_status_error_server_error() {
        let error = status_error(StatusCode::BAD_GATEWAY, None, "upstream".to_string());
        match error {
            CatalogError::Request(msg) => {
                assert!(msg.contains("502"));
                assert!(msg.contains("upstream"));
            }
            other => panic!("Expected Request error, got {:?}", other),
        }
    }
}
