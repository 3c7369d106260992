use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::errors::ApiError;
use crate::models::Product;
use crate::services::{ProductPage, ProductSearch};
use crate::AppState;

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(search): Query<ProductSearch>,
) -> Result<Json<ProductPage>, ApiError> {
    let page = state.services.products.list_products(search).await?;
    Ok(Json(page))
}

/// GET /api/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state.services.products.get_product(&id).await?;
    Ok(Json(product))
}
