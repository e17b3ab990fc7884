//! Cart type conversion functions.

use iradah_core::CartId;
use tracing::debug;
use url::Url;

use crate::shopify::ShopifyError;
use crate::shopify::types::CheckoutSession;

use super::super::queries::create_cart;
use super::products::convert_money;

/// Turn a `cartCreate` payload into a checkout session.
///
/// User errors win over a partially created cart; Shopify can return both.
pub fn convert_checkout(
    payload: create_cart::CartCreatePayload,
) -> Result<CheckoutSession, ShopifyError> {
    if !payload.user_errors.is_empty() {
        return Err(ShopifyError::UserError(
            payload
                .user_errors
                .into_iter()
                .map(|e| {
                    debug!(
                        code = ?e.code,
                        field = ?e.field,
                        message = %e.message,
                        "cartCreate user error"
                    );
                    e.message
                })
                .collect::<Vec<_>>()
                .join("; "),
        ));
    }

    let cart = payload
        .cart
        .ok_or_else(|| ShopifyError::message("Failed to create cart"))?;

    let checkout_url = Url::parse(&cart.checkout_url).map_err(|e| {
        ShopifyError::InvalidResponse(format!("checkout URL {:?}: {e}", cart.checkout_url))
    })?;

    Ok(CheckoutSession {
        cart_id: CartId::new(cart.id),
        checkout_url,
        total_quantity: u32::try_from(cart.total_quantity).unwrap_or(0),
        total: cart.cost.map(|c| convert_money(c.total_amount)),
    })
}
