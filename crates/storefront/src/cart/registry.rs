//! Per-session cart stores for the HTTP server.
//!
//! The session cookie only carries a cart ID; the carts themselves live in a
//! `moka` cache and are dropped after a period of inactivity.

use std::sync::Arc;
use std::time::Duration;

use iradah_core::CurrencyCode;
use moka::sync::Cache;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::CartStore;

/// A cart shared between concurrent requests of one session.
pub type SharedCart = Arc<Mutex<CartStore>>;

const MAX_CARTS: u64 = 100_000;

/// Idle-expiring map from cart ID to cart store.
#[derive(Clone)]
pub struct CartRegistry {
    carts: Cache<Uuid, SharedCart>,
    currency: CurrencyCode,
}

impl CartRegistry {
    /// Create a registry whose new carts report empty totals in `currency`.
    #[must_use]
    pub fn new(currency: CurrencyCode, idle_timeout: Duration) -> Self {
        Self {
            carts: Cache::builder()
                .max_capacity(MAX_CARTS)
                .time_to_idle(idle_timeout)
                .build(),
            currency,
        }
    }

    /// Look up an existing cart.
    #[must_use]
    pub fn get(&self, id: &Uuid) -> Option<SharedCart> {
        self.carts.get(id)
    }

    /// Return the cart for `id`, creating it (under a fresh ID when `id` is
    /// `None`) if it does not exist or has expired.
    #[must_use]
    pub fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, SharedCart) {
        let id = id.unwrap_or_else(Uuid::new_v4);
        let cart = self
            .carts
            .get_with(id, || Arc::new(Mutex::new(CartStore::new(self.currency.clone()))));
        (id, cart)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registry() -> CartRegistry {
        CartRegistry::new(CurrencyCode::pkr(), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_cart() {
        let registry = registry();
        let (id, cart) = registry.get_or_create(None);
        cart.lock().await.set_open(true);

        let (same_id, same) = registry.get_or_create(Some(id));
        assert_eq!(same_id, id);
        assert!(same.lock().await.is_open());
        assert!(Arc::ptr_eq(&cart, &same));
    }

    #[test]
    fn test_unknown_id_creates_fresh_cart() {
        let registry = registry();
        let stale = Uuid::new_v4();
        assert!(registry.get(&stale).is_none());

        let (id, _) = registry.get_or_create(Some(stale));
        assert_eq!(id, stale);
        assert!(registry.get(&stale).is_some());
    }

    #[tokio::test]
    async fn test_new_carts_use_registry_currency() {
        let registry = CartRegistry::new("USD".parse().unwrap(), Duration::from_secs(60));
        let (_, cart) = registry.get_or_create(None);
        assert_eq!(cart.lock().await.total_price().display(), "$0.00");
    }
}
