//! Catalog browsing endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use common::{CatalogItem, CatalogItemId};
use serde::Deserialize;
use store::{CatalogQuery, Store};

use super::{ApiResponse, AppState, parse_id};
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct MenuParams {
    pub category: Option<String>,
}

/// GET /api/menu — list catalog items, optionally narrowed to one category.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<MenuParams>,
) -> Result<Json<ApiResponse<Vec<CatalogItem>>>, ApiError> {
    let query = match params.category.filter(|c| !c.is_empty()) {
        Some(category) => CatalogQuery::for_category(category),
        None => CatalogQuery::all(),
    };
    let items = state.store.list_items(query).await?;
    Ok(ApiResponse::ok(items))
}

/// GET /api/menu/{id} — fetch a single catalog item.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CatalogItem>>, ApiError> {
    let id: CatalogItemId = parse_id(&id, "menu item")?;
    let item = state
        .store
        .get_item(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Menu item not found".to_string()))?;
    Ok(ApiResponse::ok(item))
}
