//! In-memory cart store.
//!
//! A [`CartStore`] holds the buyer's line items, the drawer visibility flag
//! and the checkout loading flag. Every mutation is synchronous; the only
//! suspension point is the checkout call to Shopify, which is split into
//! [`CartStore::begin_checkout`] and [`CartStore::finish_checkout`] so a
//! store behind a lock does not have to stay locked across the request.
//!
//! Invariants:
//! - at most one line per variant ID
//! - every line has quantity >= 1
//! - all lines share one currency

mod registry;

pub use registry::{CartRegistry, SharedCart};

use iradah_core::{CurrencyCode, Handle, Price, ProductId, VariantId};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, instrument};
use url::Url;

use crate::analytics::{self, events};
use crate::shopify::{
    CartLineInput, CheckoutGateway, CheckoutSession, Image, Product, ProductVariant,
    SelectedOption, ShopifyError,
};

/// Errors from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("cart is priced in {expected}, cannot add an item priced in {found}")]
    CurrencyMismatch {
        expected: CurrencyCode,
        found: CurrencyCode,
    },
}

/// Why a checkout could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckoutBlocked {
    #[error("cart is empty")]
    EmptyCart,
    #[error("a checkout is already in progress")]
    InFlight,
}

/// Checkout outcome for callers that need the failure reason.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Blocked(#[from] CheckoutBlocked),
    #[error("checkout failed: {0}")]
    Failed(#[from] ShopifyError),
}

/// The product a line item was added from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub handle: Handle,
    pub title: String,
    pub image: Option<Image>,
}

/// One entry in the cart, keyed by variant ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub variant_id: VariantId,
    pub product: ProductRef,
    pub variant_title: String,
    pub quantity: u32,
    /// Unit price.
    pub price: Price,
    pub selected_options: Vec<SelectedOption>,
}

impl LineItem {
    /// Build a line for `quantity` units of `variant`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ZeroQuantity` if `quantity` is 0.
    pub fn from_variant(
        product: &Product,
        variant: &ProductVariant,
        quantity: u32,
    ) -> Result<Self, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        Ok(Self {
            variant_id: variant.id.clone(),
            product: ProductRef {
                id: product.id.clone(),
                handle: product.handle.clone(),
                title: product.title.clone(),
                image: product.featured_image().cloned(),
            },
            variant_title: variant.title.clone(),
            quantity,
            price: variant.price.clone(),
            selected_options: variant.selected_options.clone(),
        })
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Cart state for one buyer.
#[derive(Debug, Clone)]
pub struct CartStore {
    items: Vec<LineItem>,
    is_open: bool,
    is_loading: bool,
    currency: CurrencyCode,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new(CurrencyCode::default())
    }
}

impl CartStore {
    /// An empty, closed cart whose empty total is reported in `currency`.
    #[must_use]
    pub const fn new(currency: CurrencyCode) -> Self {
        Self {
            items: Vec::new(),
            is_open: false,
            is_loading: false,
            currency,
        }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currency of the cart's totals.
    #[must_use]
    pub fn currency(&self) -> &CurrencyCode {
        self.items
            .first()
            .map_or(&self.currency, |item| &item.price.currency_code)
    }

    /// Add a line, or increase the quantity of the existing line for the
    /// same variant. Accumulated quantities saturate at `u32::MAX`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ZeroQuantity` for an empty line and
    /// `CartError::CurrencyMismatch` if the item is priced in a different
    /// currency than the lines already in the cart.
    pub fn add_item(&mut self, item: LineItem) -> Result<(), CartError> {
        if item.quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        if let Some(first) = self.items.first()
            && first.price.currency_code != item.price.currency_code
        {
            return Err(CartError::CurrencyMismatch {
                expected: first.price.currency_code.clone(),
                found: item.price.currency_code,
            });
        }

        analytics::track_event(
            events::ADD_TO_CART,
            &serde_json::json!({
                "variant_id": item.variant_id,
                "quantity": item.quantity,
                "price": item.price.amount,
                "currency": item.price.currency_code,
            }),
        );

        match self.find_mut(&item.variant_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                debug!(variant_id = %item.variant_id, quantity = existing.quantity, "Increased line quantity");
            }
            None => {
                debug!(variant_id = %item.variant_id, quantity = item.quantity, "Added line");
                self.items.push(item);
            }
        }
        Ok(())
    }

    /// Set a line's quantity. Zero or negative removes the line.
    ///
    /// Returns `false` if the cart has no line for `variant_id`.
    pub fn update_quantity(&mut self, variant_id: &VariantId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(variant_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.find_mut(variant_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove the line for `variant_id`. Returns `false` if there was none.
    pub fn remove_item(&mut self, variant_id: &VariantId) -> bool {
        let Some(index) = self.items.iter().position(|i| &i.variant_id == variant_id) else {
            return false;
        };

        let removed = self.items.remove(index);
        analytics::track_event(
            events::REMOVE_FROM_CART,
            &serde_json::json!({
                "variant_id": removed.variant_id,
                "quantity": removed.quantity,
            }),
        );
        true
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of unit price times quantity over all lines.
    ///
    /// An empty cart totals zero in the cart's currency.
    #[must_use]
    pub fn total_price(&self) -> Price {
        let line_totals: Vec<Price> = self.items.iter().map(LineItem::line_total).collect();
        match Price::try_sum(&line_totals) {
            Ok(Some(total)) => total,
            Ok(None) => Price::zero(self.currency().clone()),
            // add_item keeps every line in one currency
            Err(e) => {
                error!(error = %e, "Cart lines disagree on currency");
                Price::zero(self.currency().clone())
            }
        }
    }

    pub const fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }

    /// Mark a checkout as in flight and return the lines to send.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutBlocked::InFlight` if a checkout already started and
    /// `CheckoutBlocked::EmptyCart` if there is nothing to buy. Neither
    /// changes the loading flag.
    pub fn begin_checkout(&mut self) -> Result<Vec<CartLineInput>, CheckoutBlocked> {
        if self.is_loading {
            return Err(CheckoutBlocked::InFlight);
        }
        if self.items.is_empty() {
            return Err(CheckoutBlocked::EmptyCart);
        }

        self.is_loading = true;
        analytics::track_event(
            events::BEGIN_CHECKOUT,
            &serde_json::json!({
                "items": self.total_items(),
                "value": self.total_price().amount,
                "currency": self.currency(),
            }),
        );

        Ok(self
            .items
            .iter()
            .map(|i| CartLineInput {
                merchandise_id: i.variant_id.clone(),
                quantity: i.quantity,
            })
            .collect())
    }

    /// Clear the loading flag set by [`Self::begin_checkout`].
    pub const fn finish_checkout(&mut self) {
        self.is_loading = false;
    }

    /// Create a hosted checkout for the current lines.
    ///
    /// Returns the checkout URL, or `None` if the cart is empty, a checkout
    /// is already running, or Shopify rejected the request. The cart's lines
    /// are never modified and the loading flag is cleared before returning.
    #[instrument(skip_all, fields(lines = self.items.len()))]
    pub async fn create_checkout<G>(&mut self, gateway: &G) -> Option<Url>
    where
        G: CheckoutGateway + ?Sized,
    {
        match self.try_checkout(gateway).await {
            Ok(session) => Some(session.checkout_url),
            Err(CheckoutError::Blocked(reason)) => {
                debug!(%reason, "Checkout not started");
                None
            }
            Err(CheckoutError::Failed(e)) => {
                error!(error = %e, "Checkout creation failed");
                None
            }
        }
    }

    /// Like [`Self::create_checkout`] but reports why no URL was produced.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Blocked` if the checkout could not start and
    /// `CheckoutError::Failed` if Shopify returned an error.
    pub async fn try_checkout<G>(&mut self, gateway: &G) -> Result<CheckoutSession, CheckoutError>
    where
        G: CheckoutGateway + ?Sized,
    {
        let lines = self.begin_checkout()?;
        let result = gateway.create_checkout(lines).await;
        self.finish_checkout();
        Ok(result?)
    }

    /// Serializable view of the cart.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        let total_price = self.total_price();
        CartSnapshot {
            lines: self
                .items
                .iter()
                .map(|item| LineSnapshot {
                    line_total: item.line_total(),
                    item: item.clone(),
                })
                .collect(),
            total_items: self.total_items(),
            subtotal: total_price.display(),
            total_price,
            is_open: self.is_open,
            is_loading: self.is_loading,
        }
    }

    fn find_mut(&mut self, variant_id: &VariantId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|i| &i.variant_id == variant_id)
    }
}

/// Line item plus its computed total.
#[derive(Debug, Clone, Serialize)]
pub struct LineSnapshot {
    #[serde(flatten)]
    pub item: LineItem,
    pub line_total: Price,
}

/// Read-only view of a cart for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct CartSnapshot {
    pub lines: Vec<LineSnapshot>,
    pub total_items: u64,
    pub total_price: Price,
    /// `total_price` formatted for display.
    pub subtotal: String,
    pub is_open: bool,
    pub is_loading: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use iradah_core::CartId;

    use super::*;
    use crate::shopify::PriceRange;

    fn price(amount: &str) -> Price {
        Price::parse(amount, "PKR").unwrap()
    }

    fn product(handle: &str, variants: Vec<ProductVariant>) -> Product {
        let min = variants.first().map_or_else(|| price("0"), |v| v.price.clone());
        Product {
            id: ProductId::new(format!("gid://shopify/Product/{handle}")),
            handle: Handle::new(handle),
            title: handle.to_string(),
            description: String::new(),
            price_range: PriceRange {
                min_variant_price: min.clone(),
                max_variant_price: min,
            },
            images: vec![Image {
                url: format!("https://cdn.example/{handle}.jpg"),
                alt_text: None,
            }],
            options: Vec::new(),
            variants,
        }
    }

    fn variant(id: &str, amount: &str) -> ProductVariant {
        ProductVariant {
            id: VariantId::new(id),
            title: "M".to_string(),
            available_for_sale: true,
            price: price(amount),
            compare_at_price: None,
            selected_options: vec![SelectedOption {
                name: "Size".to_string(),
                value: "M".to_string(),
            }],
        }
    }

    fn line(id: &str, amount: &str, quantity: u32) -> LineItem {
        let v = variant(id, amount);
        LineItem::from_variant(&product("hoodie", vec![v.clone()]), &v, quantity).unwrap()
    }

    /// Gateway that records the lines it was sent and replies with a fixed result.
    struct FakeGateway {
        fail: bool,
        received: Mutex<Vec<Vec<CartLineInput>>>,
    }

    impl FakeGateway {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                received: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.received.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CheckoutGateway for FakeGateway {
        async fn create_checkout(
            &self,
            lines: Vec<CartLineInput>,
        ) -> Result<CheckoutSession, ShopifyError> {
            let total_quantity = lines.iter().map(|l| l.quantity).sum();
            self.received.lock().unwrap().push(lines);
            if self.fail {
                return Err(ShopifyError::UserError("Variant is sold out".to_string()));
            }
            Ok(CheckoutSession {
                cart_id: CartId::new("gid://shopify/Cart/1"),
                checkout_url: Url::parse("https://iradah.myshopify.com/cart/c/1").unwrap(),
                total_quantity,
                total: None,
            })
        }
    }

    #[test]
    fn test_new_cart_is_empty_and_closed() {
        let cart = CartStore::default();
        assert!(cart.is_empty());
        assert!(!cart.is_open());
        assert!(!cart.is_loading());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Price::zero(CurrencyCode::pkr()));
    }

    #[test]
    fn test_empty_total_uses_configured_currency() {
        let cart = CartStore::new("USD".parse().unwrap());
        assert_eq!(cart.total_price().display(), "$0.00");
    }

    #[test]
    fn test_add_same_variant_accumulates() {
        let mut cart = CartStore::default();
        cart.add_item(line("v1", "4500", 1)).unwrap();
        cart.add_item(line("v1", "4500", 2)).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut cart = CartStore::default();
        cart.add_item(line("v2", "100", 1)).unwrap();
        cart.add_item(line("v1", "100", 1)).unwrap();
        cart.add_item(line("v2", "100", 1)).unwrap();

        let ids: Vec<_> = cart.items().iter().map(|i| i.variant_id.as_str()).collect();
        assert_eq!(ids, ["v2", "v1"]);
    }

    #[test]
    fn test_quantity_saturates() {
        let mut cart = CartStore::default();
        cart.add_item(line("v1", "1", u32::MAX)).unwrap();
        cart.add_item(line("v1", "1", 5)).unwrap();
        assert_eq!(cart.items()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let v = variant("v1", "100");
        let p = product("hoodie", vec![v.clone()]);
        assert_eq!(
            LineItem::from_variant(&p, &v, 0).unwrap_err(),
            CartError::ZeroQuantity
        );

        let mut cart = CartStore::default();
        let mut item = line("v1", "100", 1);
        item.quantity = 0;
        assert_eq!(cart.add_item(item).unwrap_err(), CartError::ZeroQuantity);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_mixed_currency_rejected() {
        let mut cart = CartStore::default();
        cart.add_item(line("v1", "100", 1)).unwrap();

        let mut usd = line("v2", "10", 1);
        usd.price = Price::parse("10", "USD").unwrap();
        let err = cart.add_item(usd).unwrap_err();
        assert!(matches!(err, CartError::CurrencyMismatch { .. }));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut cart = CartStore::default();
        cart.add_item(line("v1", "100", 1)).unwrap();

        assert!(cart.update_quantity(&VariantId::new("v1"), 5));
        assert_eq!(cart.items()[0].quantity, 5);

        assert!(!cart.update_quantity(&VariantId::new("missing"), 5));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_update_quantity_zero_or_negative_removes() {
        let mut cart = CartStore::default();
        cart.add_item(line("v1", "100", 2)).unwrap();
        cart.add_item(line("v2", "100", 2)).unwrap();

        assert!(cart.update_quantity(&VariantId::new("v1"), 0));
        assert!(cart.update_quantity(&VariantId::new("v2"), -3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_clamps_large_values() {
        let mut cart = CartStore::default();
        cart.add_item(line("v1", "1", 1)).unwrap();
        cart.update_quantity(&VariantId::new("v1"), i64::MAX);
        assert_eq!(cart.items()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = CartStore::default();
        cart.add_item(line("v1", "100", 1)).unwrap();

        assert!(!cart.remove_item(&VariantId::new("v2")));
        assert_eq!(cart.items().len(), 1);
        assert!(cart.remove_item(&VariantId::new("v1")));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_price_is_exact() {
        let mut cart = CartStore::default();
        cart.add_item(line("v1", "0.10", 3)).unwrap();
        cart.add_item(line("v2", "4500.50", 2)).unwrap();

        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.total_price(), price("9001.30"));
        assert_eq!(cart.total_price().display(), "PKR 9,001.30");
    }

    #[test]
    fn test_set_open() {
        let mut cart = CartStore::default();
        cart.set_open(true);
        assert!(cart.is_open());
        cart.set_open(false);
        assert!(!cart.is_open());
    }

    #[test]
    fn test_begin_checkout_guards() {
        let mut cart = CartStore::default();
        assert_eq!(cart.begin_checkout().unwrap_err(), CheckoutBlocked::EmptyCart);
        assert!(!cart.is_loading());

        cart.add_item(line("v1", "100", 2)).unwrap();
        let lines = cart.begin_checkout().unwrap();
        assert!(cart.is_loading());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);

        assert_eq!(cart.begin_checkout().unwrap_err(), CheckoutBlocked::InFlight);
        cart.finish_checkout();
        assert!(!cart.is_loading());
    }

    #[tokio::test]
    async fn test_checkout_success_returns_url() {
        let gateway = FakeGateway::new(false);
        let mut cart = CartStore::default();
        cart.add_item(line("v1", "100", 2)).unwrap();
        cart.add_item(line("v2", "50", 1)).unwrap();

        let url = cart.create_checkout(&gateway).await.unwrap();
        assert_eq!(url.as_str(), "https://iradah.myshopify.com/cart/c/1");
        assert!(!cart.is_loading());
        assert_eq!(cart.items().len(), 2);

        let sent = gateway.received.lock().unwrap();
        assert_eq!(sent[0][0].merchandise_id, VariantId::new("v1"));
        assert_eq!(sent[0][0].quantity, 2);
        assert_eq!(sent[0][1].merchandise_id, VariantId::new("v2"));
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_returns_none() {
        let gateway = FakeGateway::new(false);
        let mut cart = CartStore::default();

        assert!(cart.create_checkout(&gateway).await.is_none());
        assert!(!cart.is_loading());
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_checkout_leaves_cart_unchanged() {
        let gateway = FakeGateway::new(true);
        let mut cart = CartStore::default();
        cart.add_item(line("v1", "100", 2)).unwrap();
        let before = cart.items().to_vec();

        assert!(cart.create_checkout(&gateway).await.is_none());
        assert!(!cart.is_loading());
        assert_eq!(cart.items(), before.as_slice());
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_try_checkout_reports_failure() {
        let gateway = FakeGateway::new(true);
        let mut cart = CartStore::default();
        cart.add_item(line("v1", "100", 1)).unwrap();

        let err = cart.try_checkout(&gateway).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Failed(ShopifyError::UserError(_))));
    }

    #[test]
    fn test_snapshot() {
        let mut cart = CartStore::default();
        cart.add_item(line("v1", "1500", 3)).unwrap();
        cart.set_open(true);

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.total_items, 3);
        assert_eq!(snapshot.subtotal, "PKR 4,500.00");
        assert_eq!(snapshot.lines[0].line_total, price("4500"));
        assert!(snapshot.is_open);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["lines"][0]["variant_id"], "v1");
        assert_eq!(json["lines"][0]["product"]["handle"], "hoodie");
        assert_eq!(json["total_price"]["amount"], "4500");
    }
}
