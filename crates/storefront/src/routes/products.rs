//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use iradah_core::{Handle, Price, VariantId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::analytics::{self, events};
use crate::catalog::{SortOrder, VariantSelection};
use crate::error::{AppError, Result};
use crate::shopify::{Image, Product};
use crate::state::AppState;

const MAX_LIMIT: i64 = 250;

/// Product card data for listings.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub handle: Handle,
    pub title: String,
    pub price: Price,
    /// `price` formatted for display.
    pub price_display: String,
    pub image: Option<Image>,
    pub sold_out: bool,
    /// Variant added by quick-add (the first variant).
    pub quick_add_variant_id: Option<VariantId>,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            price: product.min_price().clone(),
            price_display: product.min_price().display(),
            image: product.featured_image().cloned(),
            sold_out: product.is_sold_out(),
            quick_add_variant_id: product.first_variant().map(|v| v.id.clone()),
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub sort: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub sort: SortOrder,
    pub count: usize,
    pub products: Vec<ProductSummary>,
}

#[derive(Debug, Serialize)]
pub struct ProductDetailResponse {
    pub product: Product,
    pub selection: VariantSelection,
    /// Whether the selected variant can be added to the cart.
    pub available: bool,
    pub price_display: Option<String>,
}

/// Product listing.
///
/// # Errors
///
/// Returns 400 for an unknown sort order or out-of-range limit, 502 if
/// Shopify fails.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductListResponse>> {
    let sort = query
        .sort
        .as_deref()
        .map(str::parse::<SortOrder>)
        .transpose()?
        .unwrap_or_default();

    let limit = query.limit.unwrap_or(state.config().product_limit);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let mut products = state.storefront().get_products(limit, None).await?.products;
    sort.apply(&mut products);

    Ok(Json(ProductListResponse {
        sort,
        count: products.len(),
        products: products.iter().map(ProductSummary::from).collect(),
    }))
}

/// Product detail with the default variant selection.
///
/// # Errors
///
/// Returns 404 if no product has this handle, 502 if Shopify fails.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<ProductDetailResponse>> {
    let product = state.storefront().get_product_by_handle(&handle).await?;

    let selection = VariantSelection::initial(&product);
    let variant = selection.variant(&product);
    let available = variant.is_some_and(|v| v.available_for_sale);
    let price_display = variant.map(|v| v.price.display());

    analytics::track_event(
        events::VIEW_ITEM,
        &serde_json::json!({
            "handle": product.handle,
            "title": product.title,
            "price": product.min_price().amount,
            "currency": product.min_price().currency_code,
        }),
    );

    Ok(Json(ProductDetailResponse {
        product,
        selection,
        available,
        price_display,
    }))
}
