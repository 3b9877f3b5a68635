//! Application state shared across handlers.

use std::sync::Arc;

use luneva_core::content::LinkResolver;

use crate::cart::CartCoordinator;
use crate::config::StorefrontConfig;
use crate::sanity::SanityClient;
use crate::shopify::StorefrontClient;

/// Shared state, cheaply cloneable via `Arc`.
///
/// Constructing the state performs no I/O; the remote clients connect
/// lazily on first use.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storefront: StorefrontClient,
    sanity: SanityClient,
    carts: CartCoordinator<StorefrontClient>,
    links: LinkResolver,
}

impl AppState {
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let storefront = StorefrontClient::new(&config.shopify);
        let sanity = SanityClient::new(&config.sanity);
        let carts = CartCoordinator::new(storefront.clone());
        let links = LinkResolver::new(config.own_domains());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                storefront,
                sanity,
                carts,
                links,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Shopify Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    /// Sanity content API client.
    #[must_use]
    pub fn sanity(&self) -> &SanityClient {
        &self.inner.sanity
    }

    #[must_use]
    pub fn carts(&self) -> &CartCoordinator<StorefrontClient> {
        &self.inner.carts
    }

    /// Link resolver for the storefront's own domains.
    #[must_use]
    pub fn links(&self) -> &LinkResolver {
        &self.inner.links
    }
}
