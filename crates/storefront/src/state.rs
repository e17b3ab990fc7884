//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::cart::CartRegistry;
use crate::config::StorefrontConfig;
use crate::shopify::{StorefrontApi, StorefrontClient};

/// How long an untouched cart is kept in memory (7 days, same as the session).
pub const CART_IDLE_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the Shopify backend and the per-session carts.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storefront: Arc<dyn StorefrontApi>,
    carts: CartRegistry,
}

impl AppState {
    /// Create state backed by the live Storefront API.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let storefront = Arc::new(StorefrontClient::new(&config.shopify));
        Self::with_backend(config, storefront)
    }

    /// Create state with an explicit catalog and checkout backend.
    #[must_use]
    pub fn with_backend(config: StorefrontConfig, storefront: Arc<dyn StorefrontApi>) -> Self {
        let carts = CartRegistry::new(config.currency.clone(), CART_IDLE_TIMEOUT);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                storefront,
                carts,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the Shopify backend.
    #[must_use]
    pub fn storefront(&self) -> &dyn StorefrontApi {
        self.inner.storefront.as_ref()
    }

    /// Get the per-session cart registry.
    #[must_use]
    pub fn carts(&self) -> &CartRegistry {
        &self.inner.carts
    }
}
