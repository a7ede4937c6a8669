//! Store catalog refresh endpoint handler.

use axum::{extract::State, Json};
use domain::models::{CatalogQuery, RefreshCatalogRequest};
use domain::services::RefreshSummary;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::MethodPayload;

/// Refresh one page of the store catalog.
///
/// Missing parameters fall back to `APPLICATION` / `TOP_FREE`, limit 1000, skip 0.
pub async fn refresh_store_apps(
    State(state): State<AppState>,
    MethodPayload(request): MethodPayload<RefreshCatalogRequest>,
) -> Result<Json<RefreshSummary>, ApiError> {
    let query = CatalogQuery::from(request);

    tracing::info!(
        category = %query.category,
        collection = %query.collection,
        limit = query.limit,
        skip = query.skip,
        "Refreshing store apps"
    );

    let summary = state.catalog.refresh(query).await?;
    Ok(Json(summary))
}
