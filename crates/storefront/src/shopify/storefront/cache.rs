//! Cache types for Storefront API responses.

use crate::shopify::types::{
    Collection, CollectionConnection, Product, ProductConnection, ProductSummary,
};

/// Cached value types.
///
/// Card lookups cache misses too, so a content grid naming a deleted
/// product does not hit the API on every page view.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    ProductCard(Option<Box<ProductSummary>>),
    Products(ProductConnection),
    Collection(Box<Collection>),
    Collections(CollectionConnection),
}
