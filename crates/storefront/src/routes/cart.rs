//! Cart route handlers.
//!
//! Each session owns one [`CartStore`](crate::cart::CartStore). The session
//! only stores the cart's UUID; the store lives in the
//! [`CartRegistry`](crate::cart::CartRegistry). Every handler returns the
//! resulting cart snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use iradah_core::VariantId;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use crate::cart::{CartSnapshot, CartStore, CheckoutBlocked, CheckoutError, LineItem, SharedCart};
use crate::catalog;
use crate::error::{AppError, Result};
use crate::models::session_keys;
use crate::state::AppState;

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart ID from the session.
async fn get_cart_id(session: &Session) -> Option<Uuid> {
    session
        .get::<Uuid>(session_keys::CART_ID)
        .await
        .ok()
        .flatten()
}

/// The session's existing cart, if it has one that has not expired.
async fn existing_cart(state: &AppState, session: &Session) -> Option<SharedCart> {
    let id = get_cart_id(session).await?;
    state.carts().get(&id)
}

/// The session's cart, created (and remembered in the session) if needed.
async fn session_cart(state: &AppState, session: &Session) -> Result<SharedCart> {
    let current = get_cart_id(session).await;
    let (id, cart) = state.carts().get_or_create(current);

    if current != Some(id) {
        session
            .insert(session_keys::CART_ID, id)
            .await
            .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    }

    Ok(cart)
}

/// Resolve a path segment to a line's variant ID.
///
/// Accepts the full global ID (percent-encoded in the URL) or just its
/// trailing number, e.g. `/cart/items/4242`.
fn line_variant_id(cart: &CartStore, raw: &str) -> VariantId {
    cart.items()
        .iter()
        .map(|item| &item.variant_id)
        .find(|id| id.as_str() == raw || id.numeric_part() == Some(raw))
        .cloned()
        .unwrap_or_else(|| VariantId::new(raw))
}

fn empty_snapshot(state: &AppState) -> CartSnapshot {
    CartStore::new(state.config().currency.clone()).snapshot()
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Add to cart request.
///
/// With only `handle`, the first variant is added (quick-add).
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub handle: String,
    pub variant_id: Option<VariantId>,
    pub quantity: Option<u32>,
    /// Option choices (e.g. `{"Size": "M"}`) used when `variant_id` is absent.
    pub options: Option<BTreeMap<String, String>>,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// Drawer visibility request.
#[derive(Debug, Deserialize)]
pub struct SetOpenRequest {
    pub open: bool,
}

/// Successful checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: Url,
    pub total_quantity: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the session's cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Json<CartSnapshot> {
    let snapshot = match existing_cart(&state, &session).await {
        Some(cart) => cart.lock().await.snapshot(),
        None => empty_snapshot(&state),
    };
    Json(snapshot)
}

/// Add a product variant to the cart and open the drawer.
///
/// # Errors
///
/// Returns 404 for an unknown product, 422 for an unknown variant or zero
/// quantity, 409 if the variant is sold out.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartSnapshot>> {
    let quantity = request.quantity.unwrap_or(1);
    let product = state
        .storefront()
        .get_product_by_handle(&request.handle)
        .await?;

    let variant = catalog::purchasable_variant(
        &product,
        request.variant_id.as_ref(),
        request.options.as_ref(),
    )?;
    let item = LineItem::from_variant(&product, variant, quantity)?;

    let cart = session_cart(&state, &session).await?;
    let mut cart = cart.lock().await;
    cart.add_item(item)?;
    cart.set_open(true);

    Ok(Json(cart.snapshot()))
}

/// Set a line's quantity; zero or negative removes it, and removing a line
/// that is not in the cart is a no-op.
///
/// # Errors
///
/// Returns 404 for a positive quantity when the cart has no such line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(variant_id): Path<String>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartSnapshot>> {
    let removal = request.quantity <= 0;
    let missing = || AppError::NotFound(format!("cart line {variant_id}"));

    let Some(cart) = existing_cart(&state, &session).await else {
        return if removal {
            Ok(Json(empty_snapshot(&state)))
        } else {
            Err(missing())
        };
    };

    let mut cart = cart.lock().await;
    let line_id = line_variant_id(&cart, &variant_id);
    if !cart.update_quantity(&line_id, request.quantity) && !removal {
        return Err(missing());
    }

    Ok(Json(cart.snapshot()))
}

/// Remove a line. Removing a line that is not in the cart is a no-op.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(variant_id): Path<String>,
) -> Json<CartSnapshot> {
    let snapshot = match existing_cart(&state, &session).await {
        Some(cart) => {
            let mut cart = cart.lock().await;
            let line_id = line_variant_id(&cart, &variant_id);
            cart.remove_item(&line_id);
            cart.snapshot()
        }
        None => empty_snapshot(&state),
    };
    Json(snapshot)
}

/// Open or close the cart drawer.
///
/// # Errors
///
/// Returns 500 if the session cannot be written.
#[instrument(skip(state, session))]
pub async fn set_open(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SetOpenRequest>,
) -> Result<Json<CartSnapshot>> {
    let cart = session_cart(&state, &session).await?;
    let mut cart = cart.lock().await;
    cart.set_open(request.open);
    Ok(Json(cart.snapshot()))
}

/// Hand the cart over to Shopify checkout.
///
/// The cart lock is released while Shopify is called; the loading flag
/// keeps a second checkout for the same cart from starting meanwhile. A
/// successful checkout closes the drawer.
///
/// # Errors
///
/// Returns 422 for an empty cart, 409 if a checkout is already running and
/// 502 if Shopify fails. The cart is unchanged in every case.
#[instrument(skip(state, session))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CheckoutResponse>> {
    let cart = existing_cart(&state, &session)
        .await
        .ok_or(CheckoutError::Blocked(CheckoutBlocked::EmptyCart))?;

    let lines = cart
        .lock()
        .await
        .begin_checkout()
        .map_err(CheckoutError::from)?;

    // Spawned so the loading flag is cleared even if the client disconnects.
    let task_state = state.clone();
    let task_cart = Arc::clone(&cart);
    let joined = tokio::spawn(async move {
        let result = task_state.storefront().create_checkout(lines).await;
        let mut cart = task_cart.lock().await;
        cart.finish_checkout();
        if result.is_ok() {
            cart.set_open(false);
        }
        result
    })
    .await;

    let result = match joined {
        Ok(result) => result,
        Err(e) => {
            // The task died before clearing the flag
            cart.lock().await.finish_checkout();
            return Err(AppError::Internal(format!("checkout task failed: {e}")));
        }
    };

    let checkout = result.map_err(CheckoutError::from)?;
    tracing::info!(
        cart_id = %checkout.cart_id,
        total_quantity = checkout.total_quantity,
        "Checkout created"
    );

    Ok(Json(CheckoutResponse {
        checkout_url: checkout.checkout_url,
        total_quantity: checkout.total_quantity,
    }))
}
