//! Data-source seams between page loaders and the remote APIs.
//!
//! Loaders are generic over these traits so they can run against the real
//! Shopify and Sanity clients in production and in-memory fakes in tests.

use std::future::Future;

use luneva_core::content::{Footer, Header, Hero, HomePage, Settings, VideoBanner};

use crate::sanity::{SanityClient, SanityError};
use crate::shopify::{CollectionSummary, ProductSummary, ShopifyError, StorefrontClient};

/// Catalog lookups needed by content-driven pages.
pub trait Catalog: Send + Sync {
    /// Card fields for a product, `None` when no product has the handle.
    fn product_card(
        &self,
        handle: &str,
    ) -> impl Future<Output = Result<Option<ProductSummary>, ShopifyError>> + Send;

    fn featured_collection(
        &self,
    ) -> impl Future<Output = Result<Option<CollectionSummary>, ShopifyError>> + Send;

    fn recommended_products(
        &self,
    ) -> impl Future<Output = Result<Vec<ProductSummary>, ShopifyError>> + Send;
}

/// Content documents needed by the page shell and the home page.
pub trait ContentSource: Send + Sync {
    fn header(&self) -> impl Future<Output = Result<Option<Header>, SanityError>> + Send;

    fn footer(&self) -> impl Future<Output = Result<Option<Footer>, SanityError>> + Send;

    fn settings(&self) -> impl Future<Output = Result<Option<Settings>, SanityError>> + Send;

    fn home_page(&self) -> impl Future<Output = Result<Option<HomePage>, SanityError>> + Send;

    fn active_hero(&self) -> impl Future<Output = Result<Option<Hero>, SanityError>> + Send;

    fn active_video_banner(
        &self,
    ) -> impl Future<Output = Result<Option<VideoBanner>, SanityError>> + Send;
}

impl Catalog for StorefrontClient {
    async fn product_card(&self, handle: &str) -> Result<Option<ProductSummary>, ShopifyError> {
        self.get_product_card(handle).await
    }

    async fn featured_collection(&self) -> Result<Option<CollectionSummary>, ShopifyError> {
        self.get_featured_collection().await
    }

    async fn recommended_products(&self) -> Result<Vec<ProductSummary>, ShopifyError> {
        self.get_recommended_products().await
    }
}

impl ContentSource for SanityClient {
    async fn header(&self) -> Result<Option<Header>, SanityError> {
        self.get_header().await
    }

    async fn footer(&self) -> Result<Option<Footer>, SanityError> {
        self.get_footer().await
    }

    async fn settings(&self) -> Result<Option<Settings>, SanityError> {
        self.get_settings().await
    }

    async fn home_page(&self) -> Result<Option<HomePage>, SanityError> {
        self.get_home_page().await
    }

    async fn active_hero(&self) -> Result<Option<Hero>, SanityError> {
        self.get_active_hero().await
    }

    async fn active_video_banner(&self) -> Result<Option<VideoBanner>, SanityError> {
        self.get_active_video_banner().await
    }
}
