//! Session-related types.
//!
//! The session only holds a reference to the buyer's cart; the cart itself
//! lives in the in-memory [`CartRegistry`](crate::cart::CartRegistry).

/// Session keys.
pub mod keys {
    /// Key for the buyer's cart ID (a UUID).
    pub const CART_ID: &str = "cart_id";
}
