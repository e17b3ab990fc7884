//! Collection route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use crate::catalog::{self, CollectionInfo};
use crate::error::Result;
use crate::routes::products::ProductSummary;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CollectionResponse {
    pub collection: &'static CollectionInfo,
    pub count: usize,
    pub products: Vec<ProductSummary>,
}

/// Products of one category, matched by title.
///
/// # Errors
///
/// Returns 404 for an unknown category, 502 if Shopify fails.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<CollectionResponse>> {
    let info = catalog::collection(&category)?;

    let products = state
        .storefront()
        .get_products(state.config().product_limit, None)
        .await?
        .products;
    let products = info.select(products);

    Ok(Json(CollectionResponse {
        collection: info,
        count: products.len(),
        products: products.iter().map(ProductSummary::from).collect(),
    }))
}
