//! Integration tests for the Luneva storefront.
//!
//! The tests drive loaders, the cart coordinator and the router against
//! in-memory stand-ins for the Shopify and Sanity APIs, so they run without
//! network access or credentials.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p luneva-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `home` - home page loading, fallbacks and bento product resolution
//! - `cart` - optimistic cart mutations through the coordinator
//! - `router` - the assembled application and its middleware stack

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use luneva_core::content::{Footer, Header, Hero, HomePage, Settings, VideoBanner};
use luneva_core::{CartId, CartLineId, MerchandiseId, Price};
use luneva_storefront::cart::{CartBackend, CartIntent};
use luneva_storefront::config::{SanityConfig, ShopifyStorefrontConfig, StorefrontConfig};
use luneva_storefront::sanity::SanityError;
use luneva_storefront::shopify::{
    Cart, CartDiscountCode, CartLine, CartLineCost, CartLineInput, CartMerchandise,
    CartMerchandiseProduct, CollectionSummary, ProductSummary, ShopifyError,
};
use luneva_storefront::sources::{Catalog, ContentSource};
use rust_decimal::Decimal;
use secrecy::SecretString;

pub const CURRENCY: &str = "USD";

/// Configuration pointing at unreachable hosts; nothing in it is contacted
/// unless a test calls a route that needs the remote APIs.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        public_domain: "luneva.test".to_string(),
        checkout_domain: None,
        session_secret: SecretString::from("k3Jd8sLq0vPz7XwR2mNc5bTy9hGf4aUe"),
        shopify: ShopifyStorefrontConfig {
            store: "luneva-test.myshopify.com".to_string(),
            api_version: "2025-01".to_string(),
            storefront_token: SecretString::from("public-token"),
            customer_shop_id: None,
        },
        sanity: SanityConfig {
            project_id: "test".to_string(),
            dataset: "test".to_string(),
            api_version: "2024-12-25".to_string(),
            api_token: None,
        },
        sentry_dsn: None,
        sentry_environment: "test".to_string(),
    }
}

/// Price in the test currency from an amount in cents.
#[must_use]
pub fn price(cents: i64) -> Price {
    Price::new(Decimal::new(cents, 2), CURRENCY)
}

#[must_use]
pub fn product_summary(handle: &str, cents: i64) -> ProductSummary {
    ProductSummary {
        id: format!("gid://shopify/Product/{handle}"),
        handle: handle.to_string(),
        title: handle.replace('-', " "),
        price: price(cents),
        featured_image: None,
        selected_options: Vec::new(),
    }
}

#[must_use]
pub fn collection_summary(handle: &str) -> CollectionSummary {
    CollectionSummary {
        id: format!("gid://shopify/Collection/{handle}"),
        handle: handle.to_string(),
        title: handle.to_string(),
        description: String::new(),
        image: None,
    }
}

/// Merchandise for a single-variant product.
#[must_use]
pub fn merchandise(handle: &str, cents: i64) -> CartMerchandise {
    CartMerchandise {
        id: MerchandiseId::new(format!("gid://shopify/ProductVariant/{handle}")),
        title: "Default Title".to_string(),
        price: price(cents),
        selected_options: Vec::new(),
        image: None,
        product: CartMerchandiseProduct {
            id: format!("gid://shopify/Product/{handle}"),
            handle: handle.to_string(),
            title: handle.to_string(),
            vendor: "Luneva".to_string(),
        },
    }
}

#[must_use]
pub fn cart_line(id: &str, merchandise: CartMerchandise, quantity: u32) -> CartLine {
    let unit = merchandise.price.clone();
    CartLine {
        id: CartLineId::new(id),
        quantity,
        cost: CartLineCost {
            amount_per_quantity: unit.clone(),
            compare_at_amount_per_quantity: None,
            subtotal_amount: unit.times(quantity),
            total_amount: unit.times(quantity),
        },
        merchandise,
    }
}

/// Recompute quantities and totals the way the remote cart would.
pub fn recalculate(cart: &mut Cart) {
    let mut total = Price::zero(CURRENCY);
    for line in &mut cart.lines {
        line.cost.subtotal_amount = line.cost.amount_per_quantity.times(line.quantity);
        line.cost.total_amount = line.cost.subtotal_amount.clone();
        if let Ok(sum) = total.checked_add(&line.cost.total_amount) {
            total = sum;
        }
    }
    cart.total_quantity = cart.lines.iter().map(|line| line.quantity).sum();
    cart.cost.subtotal_amount = total.clone();
    cart.cost.total_amount = total;
}

// =============================================================================
// Catalog
// =============================================================================

/// Catalog backed by a fixed product list. Handles listed in `failing`
/// return an error instead of a result.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    pub products: HashMap<String, ProductSummary>,
    pub featured: Option<CollectionSummary>,
    pub failing: HashSet<String>,
    pub featured_fails: bool,
}

impl FakeCatalog {
    #[must_use]
    pub fn with_products<'a>(handles: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            products: handles
                .into_iter()
                .map(|handle| (handle.to_string(), product_summary(handle, 2500)))
                .collect(),
            featured: Some(collection_summary("featured")),
            ..Self::default()
        }
    }
}

impl Catalog for FakeCatalog {
    async fn product_card(&self, handle: &str) -> Result<Option<ProductSummary>, ShopifyError> {
        if self.failing.contains(handle) {
            return Err(ShopifyError::RateLimited(1));
        }
        Ok(self.products.get(handle).cloned())
    }

    async fn featured_collection(&self) -> Result<Option<CollectionSummary>, ShopifyError> {
        if self.featured_fails {
            return Err(ShopifyError::NotFound("featured".to_string()));
        }
        Ok(self.featured.clone())
    }

    async fn recommended_products(&self) -> Result<Vec<ProductSummary>, ShopifyError> {
        let mut products: Vec<_> = self.products.values().cloned().collect();
        products.sort_by(|a, b| a.handle.cmp(&b.handle));
        Ok(products)
    }
}

// =============================================================================
// Content
// =============================================================================

/// Content source holding one copy of each document.
#[derive(Debug, Default)]
pub struct FakeContent {
    pub header: Option<Header>,
    pub footer: Option<Footer>,
    pub settings: Option<Settings>,
    pub home_page: Option<HomePage>,
    pub hero: Option<Hero>,
    pub video_banner: Option<VideoBanner>,
    /// Every document query fails with a server error.
    pub unavailable: bool,
    /// Delay before each document query answers.
    pub latency: Duration,
}

impl FakeContent {
    async fn get<T: Clone>(&self, document: Option<&T>) -> Result<Option<T>, SanityError> {
        tokio::time::sleep(self.latency).await;
        if self.unavailable {
            return Err(SanityError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(document.cloned())
    }
}

impl ContentSource for FakeContent {
    async fn header(&self) -> Result<Option<Header>, SanityError> {
        self.get(self.header.as_ref()).await
    }

    async fn footer(&self) -> Result<Option<Footer>, SanityError> {
        self.get(self.footer.as_ref()).await
    }

    async fn settings(&self) -> Result<Option<Settings>, SanityError> {
        self.get(self.settings.as_ref()).await
    }

    async fn home_page(&self) -> Result<Option<HomePage>, SanityError> {
        self.get(self.home_page.as_ref()).await
    }

    async fn active_hero(&self) -> Result<Option<Hero>, SanityError> {
        self.get(self.hero.as_ref()).await
    }

    async fn active_video_banner(&self) -> Result<Option<VideoBanner>, SanityError> {
        self.get(self.video_banner.as_ref()).await
    }
}

// =============================================================================
// Cart backend
// =============================================================================

/// In-memory cart API. Every mutation waits `latency` before answering so
/// tests can interleave requests under a paused clock.
#[derive(Debug)]
pub struct FakeCartBackend {
    cart: Mutex<Option<Cart>>,
    latency: Duration,
    /// Codes the backend accepts; anything else is a user error.
    pub valid_discounts: HashSet<String>,
    /// Merchandise the backend knows, by variant id.
    pub catalog: HashMap<MerchandiseId, CartMerchandise>,
    applied: AtomicUsize,
}

impl FakeCartBackend {
    #[must_use]
    pub fn new(cart: Option<Cart>, latency: Duration) -> Self {
        Self {
            cart: Mutex::new(cart),
            latency,
            valid_discounts: HashSet::new(),
            catalog: HashMap::new(),
            applied: AtomicUsize::new(0),
        }
    }

    /// Mutations that reached the backend and completed.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }

    /// The backend's current cart.
    #[must_use]
    pub fn snapshot(&self) -> Option<Cart> {
        self.cart.lock().ok().and_then(|cart| cart.clone())
    }

    fn with_cart<T>(&self, f: impl FnOnce(&mut Option<Cart>) -> T) -> T {
        match self.cart.lock() {
            Ok(mut cart) => f(&mut cart),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    fn add_lines(&self, cart: &mut Cart, lines: &[CartLineInput]) -> Result<(), ShopifyError> {
        for input in lines {
            if let Some(line) = cart
                .lines
                .iter_mut()
                .find(|line| line.merchandise.id == input.merchandise_id)
            {
                line.quantity += input.quantity;
                continue;
            }
            let merchandise = self
                .catalog
                .get(&input.merchandise_id)
                .cloned()
                .ok_or_else(|| {
                    ShopifyError::UserError("The merchandise does not exist.".to_string())
                })?;
            let id = format!("gid://shopify/CartLine/{}", cart.lines.len() + 1);
            cart.lines.push(cart_line(&id, merchandise, input.quantity));
        }
        Ok(())
    }

    fn mutate(&self, cart: &mut Cart, intent: &CartIntent) -> Result<(), ShopifyError> {
        match intent {
            CartIntent::LinesAdd { lines, .. } => self.add_lines(cart, lines)?,
            CartIntent::LinesUpdate { lines } => {
                for update in lines {
                    let line = cart
                        .lines
                        .iter_mut()
                        .find(|line| line.id == update.id)
                        .ok_or_else(|| ShopifyError::UserError("Line not found.".to_string()))?;
                    line.quantity = update.quantity;
                }
                cart.lines.retain(|line| line.quantity > 0);
            }
            CartIntent::LinesRemove { line_ids } => {
                cart.lines.retain(|line| !line_ids.contains(&line.id));
            }
            CartIntent::DiscountCodesUpdate { codes } => {
                if let Some(code) = codes.iter().find(|code| !self.valid_discounts.contains(*code)) {
                    return Err(ShopifyError::UserError(format!(
                        "Discount code {code} is not valid."
                    )));
                }
                cart.discount_codes = codes
                    .iter()
                    .map(|code| CartDiscountCode {
                        code: code.clone(),
                        applicable: true,
                    })
                    .collect();
            }
            CartIntent::GiftCardCodesUpdate { .. } | CartIntent::GiftCardCodesRemove { .. } => {
                return Err(ShopifyError::UserError(
                    "Gift cards are not enabled.".to_string(),
                ));
            }
        }
        recalculate(cart);
        Ok(())
    }
}

impl CartBackend for FakeCartBackend {
    async fn fetch(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError> {
        Ok(self.with_cart(|cart| cart.as_ref().filter(|cart| &cart.id == cart_id).cloned()))
    }

    async fn create(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        let mut cart = Cart::empty(CartId::new("gid://shopify/Cart/new"), CURRENCY);
        cart.checkout_url = "https://checkout.luneva.test/cart/new".to_string();
        self.add_lines(&mut cart, &lines)?;
        recalculate(&mut cart);
        self.with_cart(|slot| *slot = Some(cart.clone()));
        Ok(cart)
    }

    async fn apply(&self, cart_id: &CartId, intent: &CartIntent) -> Result<Cart, ShopifyError> {
        tokio::time::sleep(self.latency).await;
        let result = self.with_cart(|slot| {
            let cart = slot
                .as_mut()
                .filter(|cart| &cart.id == cart_id)
                .ok_or_else(|| ShopifyError::NotFound(cart_id.to_string()))?;
            let mut next = cart.clone();
            self.mutate(&mut next, intent)?;
            *cart = next.clone();
            Ok(next)
        });
        self.applied.fetch_add(1, Ordering::SeqCst);
        result
    }
}
