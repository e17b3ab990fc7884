//! HTTP route handlers for storefront.
//!
//! Every endpoint speaks JSON. Errors are `{"error": "..."}` with the status
//! chosen by [`AppError`](crate::error::AppError).
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness check
//!
//! # Catalog
//! GET    /products?sort=&limit=       - Product listing (featured, price-low, price-high, name)
//! GET    /products/{handle}           - Product detail with default variant selection
//! GET    /collections/{category}      - hoodies, sweatshirts or trousers
//!
//! # Cart (per session)
//! GET    /cart                        - Cart snapshot
//! POST   /cart/items                  - Add {handle, variant_id?, quantity?, options?}
//! POST   /cart/items/{variant_id}     - Set quantity {quantity}; 0 or less removes
//! DELETE /cart/items/{variant_id}     - Remove line
//! POST   /cart/open                   - Drawer visibility {open}
//! POST   /cart/checkout               - Create Shopify checkout, returns {checkout_url}
//! ```

pub mod cart;
pub mod collections;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{handle}", get(products::show))
}

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new().route("/collections/{category}", get(collections::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/items", post(cart::add))
        .route(
            "/cart/items/{variant_id}",
            post(cart::update).delete(cart::remove),
        )
        .route("/cart/open", post(cart::set_open))
        .route("/cart/checkout", post(cart::checkout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(product_routes())
        .merge(collection_routes())
        .merge(cart_routes())
}
