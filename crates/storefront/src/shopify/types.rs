//! Domain types for the Shopify Storefront API.
//!
//! These types are separate from the GraphQL wire shapes in
//! `storefront::queries`; `storefront::conversions` maps between the two.
//! Money amounts use [`Price`] from the core crate throughout. Leaf types
//! whose wire shape matches one-to-one deserialize directly in camelCase.

use luneva_core::{CartId, CartLineId, GiftCardId, MerchandiseId, Price};
use serde::{Deserialize, Serialize};

// =============================================================================
// Shared Types
// =============================================================================

/// Price range for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Price,
    /// Maximum price among all variants.
    pub max_variant_price: Price,
}

/// Product, variant or collection image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Shopify image ID.
    pub id: Option<String>,
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
    /// Image width in pixels.
    pub width: Option<i64>,
    /// Image height in pixels.
    pub height: Option<i64>,
}

/// SEO metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A selected product option (e.g., Size: M).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

/// Pagination info for connections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

// =============================================================================
// Product Types
// =============================================================================

/// A product option with its possible values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub id: String,
    pub name: String,
    pub values: Vec<String>,
}

/// A purchasable product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID, used as the cart merchandise ID.
    pub id: MerchandiseId,
    pub title: String,
    pub available_for_sale: bool,
    pub price: Price,
    pub compare_at_price: Option<Price>,
    pub selected_options: Vec<SelectedOption>,
    pub image: Option<Image>,
}

/// A full product, as shown on the product detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub handle: String,
    pub title: String,
    /// Plain-text description.
    pub description: String,
    /// HTML description as authored in Shopify.
    pub description_html: String,
    pub available_for_sale: bool,
    pub vendor: String,
    pub product_type: String,
    pub tags: Vec<String>,
    pub seo: Seo,
    pub price_range: PriceRange,
    pub featured_image: Option<Image>,
    pub images: Vec<Image>,
    pub options: Vec<ProductOption>,
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// Variant to preselect: the first available one, else the first.
    #[must_use]
    pub fn default_variant(&self) -> Option<&ProductVariant> {
        self.variants
            .iter()
            .find(|variant| variant.available_for_sale)
            .or_else(|| self.variants.first())
    }

    /// Look up a variant by ID.
    #[must_use]
    pub fn variant(&self, id: &MerchandiseId) -> Option<&ProductVariant> {
        self.variants.iter().find(|variant| &variant.id == id)
    }
}

/// The subset of product fields used by cards and grids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: String,
    pub handle: String,
    pub title: String,
    /// Lowest variant price.
    pub price: Price,
    pub featured_image: Option<Image>,
    /// Options of the first variant, used for the variant-aware product URL.
    pub selected_options: Vec<SelectedOption>,
}

/// Paginated list of products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConnection {
    pub products: Vec<ProductSummary>,
    pub page_info: PageInfo,
}

/// Product sort keys supported by listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductSortKey {
    #[default]
    BestSelling,
    CreatedAt,
    Price,
    Title,
    UpdatedAt,
}

// =============================================================================
// Collection Types
// =============================================================================

/// Collection fields used by listings and the featured collection banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub image: Option<Image>,
}

/// A collection with one page of its products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub description_html: String,
    pub image: Option<Image>,
    pub seo: Seo,
    pub products: ProductConnection,
}

/// Paginated list of collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConnection {
    pub collections: Vec<CollectionSummary>,
    pub page_info: PageInfo,
}

/// Collection sort keys supported by listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectionSortKey {
    #[default]
    Title,
    UpdatedAt,
}

// =============================================================================
// Cart Types
// =============================================================================

/// A server-owned cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    /// Hosted checkout URL for this cart.
    pub checkout_url: String,
    pub total_quantity: u32,
    pub note: Option<String>,
    pub cost: CartCost,
    pub discount_codes: Vec<CartDiscountCode>,
    pub applied_gift_cards: Vec<AppliedGiftCard>,
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart, used as the base of a projection before the server
    /// has returned one.
    #[must_use]
    pub fn empty(id: CartId, currency_code: &str) -> Self {
        Self {
            id,
            checkout_url: String::new(),
            total_quantity: 0,
            note: None,
            cost: CartCost {
                subtotal_amount: Price::zero(currency_code),
                total_amount: Price::zero(currency_code),
                total_tax_amount: None,
            },
            discount_codes: Vec::new(),
            applied_gift_cards: Vec::new(),
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub fn line(&self, id: &CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Discount codes the platform accepted.
    pub fn applicable_discount_codes(&self) -> impl Iterator<Item = &str> {
        self.discount_codes
            .iter()
            .filter(|code| code.applicable)
            .map(|code| code.code.as_str())
    }
}

/// Cart cost breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCost {
    pub subtotal_amount: Price,
    pub total_amount: Price,
    pub total_tax_amount: Option<Price>,
}

/// A line item in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub quantity: u32,
    pub cost: CartLineCost,
    pub merchandise: CartMerchandise,
}

/// Cost of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineCost {
    pub amount_per_quantity: Price,
    pub compare_at_amount_per_quantity: Option<Price>,
    pub subtotal_amount: Price,
    pub total_amount: Price,
}

/// The variant a cart line refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMerchandise {
    pub id: MerchandiseId,
    /// Variant title ("Default Title" for single-variant products).
    pub title: String,
    pub price: Price,
    pub selected_options: Vec<SelectedOption>,
    pub image: Option<Image>,
    pub product: CartMerchandiseProduct,
}

/// Product fields of a cart line's merchandise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMerchandiseProduct {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub vendor: String,
}

impl CartMerchandise {
    /// Build merchandise for a line not yet confirmed by the server.
    #[must_use]
    pub fn from_variant(product: &Product, variant: &ProductVariant) -> Self {
        Self {
            id: variant.id.clone(),
            title: variant.title.clone(),
            price: variant.price.clone(),
            selected_options: variant.selected_options.clone(),
            image: variant
                .image
                .clone()
                .or_else(|| product.featured_image.clone()),
            product: CartMerchandiseProduct {
                id: product.id.clone(),
                handle: product.handle.clone(),
                title: product.title.clone(),
                vendor: product.vendor.clone(),
            },
        }
    }
}

/// A discount code on the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDiscountCode {
    pub code: String,
    /// Whether the code applies to the cart's current contents.
    pub applicable: bool,
}

/// A gift card applied to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedGiftCard {
    pub id: GiftCardId,
    /// Last characters of the gift card code.
    pub last_characters: String,
    pub amount_used: Price,
}

/// Input for adding a line to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub merchandise_id: MerchandiseId,
    pub quantity: u32,
}

impl CartLineInput {
    #[must_use]
    pub const fn new(merchandise_id: MerchandiseId, quantity: u32) -> Self {
        Self {
            merchandise_id,
            quantity,
        }
    }
}

/// Input for updating a cart line's quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineUpdateInput {
    pub id: CartLineId,
    pub quantity: u32,
}

/// A user error returned by a cart mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartUserError {
    pub code: Option<String>,
    pub field: Option<Vec<String>>,
    pub message: String,
}
