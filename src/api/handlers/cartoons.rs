use crate::api::models::{
    CartoonListResponse, CartoonResponse, DeleteCartoonResponse,
    DELETE_NOT_FOUND_MESSAGE, NOT_FOUND_MESSAGE,
};
use crate::core::error::{CatalogError, Result};
use crate::core::query::{self, ListQuery};
use crate::store::Repository;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;
use super::AppState;

/// Handler for GET /cartoons - Filter, sort, search and paginate the catalog
pub async fn list_cartoons(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let query = ListQuery::from_params(&params);
    let snapshot = state.store.find_all().await?;

    let result = query::execute(&snapshot, &query);
    tracing::debug!(
        total = result.total,
        page = result.page,
        limit = result.limit,
        "Listed cartoons"
    );

    Ok(Json(CartoonListResponse::from(result)))
}

/// Handler for GET /cartoons/:id - Get one cartoon
pub async fn get_cartoon(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let cartoon = state
        .store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| CatalogError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

    Ok(Json(CartoonResponse::from(cartoon)))
}

/// Handler for DELETE /cartoons/:id - Remove a cartoon and return what is left
pub async fn delete_cartoon(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    state
        .store
        .delete(&id)
        .await?
        .ok_or_else(|| CatalogError::NotFound(DELETE_NOT_FOUND_MESSAGE.to_string()))?;

    let remaining = state.store.find_all().await?;
    Ok(Json(DeleteCartoonResponse::new(remaining)))
}
