//! Integration test harness for the Iradah storefront API.
//!
//! Each test starts the full router (sessions, request IDs, tracing) on an
//! ephemeral port, backed by [`FakeStorefront`] instead of Shopify, and
//! talks to it over HTTP with a cookie-holding `reqwest` client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p iradah-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::expect_used, clippy::panic)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use iradah_core::{CartId, CurrencyCode, Handle, Price, ProductId, VariantId};
use iradah_storefront::config::{ShopifyStorefrontConfig, StorefrontConfig};
use iradah_storefront::shopify::{
    CartLineInput, CheckoutGateway, CheckoutSession, Image, PageInfo, PriceRange, Product,
    ProductConnection, ProductOption, ProductVariant, SelectedOption, ShopifyError, StorefrontApi,
};
use iradah_storefront::state::AppState;
use reqwest::Client;
use secrecy::SecretString;
use tokio::sync::Notify;
use url::Url;

// =============================================================================
// Fixtures
// =============================================================================

/// Shopify global ID of a test variant.
#[must_use]
pub fn variant_gid(number: u32) -> String {
    format!("gid://shopify/ProductVariant/{number}")
}

/// A PKR product with one "Size" option per variant.
///
/// `variants` holds `(number, size, available_for_sale)`.
#[must_use]
pub fn product(handle: &str, title: &str, amount: &str, variants: &[(u32, &str, bool)]) -> Product {
    let price = Price::parse(amount, "PKR").expect("valid fixture price");

    Product {
        id: ProductId::new(format!("gid://shopify/Product/{handle}")),
        handle: Handle::new(handle),
        title: title.to_string(),
        description: format!("{title} in heavyweight cotton."),
        price_range: PriceRange {
            min_variant_price: price.clone(),
            max_variant_price: price.clone(),
        },
        images: vec![Image {
            url: format!("https://cdn.shopify.com/{handle}.jpg"),
            alt_text: Some(title.to_string()),
        }],
        options: vec![ProductOption {
            name: "Size".to_string(),
            values: variants.iter().map(|(_, size, _)| (*size).to_string()).collect(),
        }],
        variants: variants
            .iter()
            .map(|(number, size, available)| ProductVariant {
                id: VariantId::new(variant_gid(*number)),
                title: (*size).to_string(),
                available_for_sale: *available,
                price: price.clone(),
                compare_at_price: None,
                selected_options: vec![SelectedOption {
                    name: "Size".to_string(),
                    value: (*size).to_string(),
                }],
            })
            .collect(),
    }
}

/// A small catalog: two hoodies, a sweatshirt and a sold-out tee.
#[must_use]
pub fn catalog() -> Vec<Product> {
    vec![
        product(
            "classic-hoodie",
            "Classic Hoodie",
            "4500",
            &[(101, "S", true), (102, "M", true), (103, "L", false)],
        ),
        product("zip-hoodie", "Zip Hoodie", "6000", &[(201, "M", true)]),
        product(
            "everyday-sweatshirt",
            "Everyday Sweatshirt",
            "3200",
            &[(301, "M", true)],
        ),
        product("archive-tee", "Archive Tee", "1800", &[(401, "M", false)]),
    ]
}

// =============================================================================
// Fake Shopify
// =============================================================================

/// How the fake answers checkout requests.
#[derive(Debug, Clone)]
pub enum CheckoutMode {
    Succeed,
    Fail,
    /// Panic inside the checkout call.
    Panic,
    /// Signal `entered`, then wait for `release` before succeeding.
    Hold {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    },
}

/// In-memory stand-in for the Shopify Storefront API.
#[derive(Debug)]
pub struct FakeStorefront {
    products: Vec<Product>,
    mode: Mutex<CheckoutMode>,
    checkout_calls: AtomicUsize,
    last_lines: Mutex<Vec<CartLineInput>>,
}

impl FakeStorefront {
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            mode: Mutex::new(CheckoutMode::Succeed),
            checkout_calls: AtomicUsize::new(0),
            last_lines: Mutex::new(Vec::new()),
        }
    }

    pub fn set_mode(&self, mode: CheckoutMode) {
        *self.mode.lock().expect("mode lock") = mode;
    }

    #[must_use]
    pub fn checkout_calls(&self) -> usize {
        self.checkout_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn last_lines(&self) -> Vec<CartLineInput> {
        self.last_lines.lock().expect("lines lock").clone()
    }
}

#[async_trait]
impl CheckoutGateway for FakeStorefront {
    async fn create_checkout(
        &self,
        lines: Vec<CartLineInput>,
    ) -> Result<CheckoutSession, ShopifyError> {
        self.checkout_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_lines.lock().expect("lines lock") = lines.clone();

        let mode = self.mode.lock().expect("mode lock").clone();
        match mode {
            CheckoutMode::Succeed => {}
            CheckoutMode::Fail => {
                return Err(ShopifyError::UserError(
                    "Merchandise does not exist".to_string(),
                ));
            }
            CheckoutMode::Panic => panic!("checkout backend crashed"),
            CheckoutMode::Hold { entered, release } => {
                entered.notify_one();
                release.notified().await;
            }
        }

        Ok(CheckoutSession {
            cart_id: CartId::new("gid://shopify/Cart/test-cart"),
            checkout_url: Url::parse("https://iradah.myshopify.com/cart/c/test-cart")
                .expect("valid checkout url"),
            total_quantity: lines.iter().map(|l| l.quantity).sum(),
            total: None,
        })
    }
}

#[async_trait]
impl StorefrontApi for FakeStorefront {
    async fn get_products(
        &self,
        first: i64,
        _query: Option<String>,
    ) -> Result<ProductConnection, ShopifyError> {
        let first = usize::try_from(first).unwrap_or(0);
        Ok(ProductConnection {
            products: self.products.iter().take(first).cloned().collect(),
            page_info: PageInfo::default(),
        })
    }

    async fn get_product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError> {
        self.products
            .iter()
            .find(|p| p.handle.as_str() == handle)
            .cloned()
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {handle}")))
    }
}

// =============================================================================
// Test Context
// =============================================================================

/// Configuration for a local test server; no environment is read.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: None,
        currency: CurrencyCode::pkr(),
        product_limit: 50,
        shopify: ShopifyStorefrontConfig {
            store: "iradah-test.myshopify.com".to_string(),
            api_version: "2025-07".to_string(),
            storefront_token: SecretString::from("unused-in-tests"),
        },
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A running storefront server plus the fake behind it.
pub struct TestContext {
    pub base_url: String,
    pub fake: Arc<FakeStorefront>,
}

impl TestContext {
    /// Serve the storefront on an ephemeral port.
    pub async fn start(fake: FakeStorefront) -> Self {
        let fake = Arc::new(fake);
        let backend: Arc<dyn StorefrontApi> = Arc::clone(&fake) as _;
        let state = AppState::with_backend(test_config(), backend);
        let app = iradah_storefront::app(state);

        let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("listener address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            fake,
        }
    }

    /// Serve the default [`catalog`].
    pub async fn with_catalog() -> Self {
        Self::start(FakeStorefront::new(catalog())).await
    }

    /// A client with its own cookie jar, i.e. its own session and cart.
    #[must_use]
    pub fn session(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client")
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
