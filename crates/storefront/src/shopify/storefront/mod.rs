//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` request/response envelopes with `reqwest` 0.13 for
//! HTTP. Caches products and collections using `moka` (5-minute TTL). Carts
//! are always fetched fresh.

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, Response};
use luneva_core::{CartId, CartLineId, GiftCardId};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{
    Cart, CartLineInput, CartLineUpdateInput, Collection, CollectionConnection,
    CollectionSortKey, CollectionSummary, Product, ProductConnection, ProductSortKey,
    ProductSummary,
};
use crate::shopify::{GraphQLError, GraphQLErrorLocation, ShopifyError};

use cache::CacheValue;
use conversions::{convert_collection_connection, convert_product_connection};
use queries::{
    CartDiscountCodesUpdate, CartGiftCardCodesRemove, CartGiftCardCodesUpdate, CartLinesAdd,
    CartLinesRemove, CartLinesUpdate, CartMutation, CreateCart, GetCart, GetCollectionByHandle,
    GetCollections, GetProductByHandle, GetProductCard, GetProducts, cart_discount_codes_update,
    cart_gift_card_codes_remove, cart_gift_card_codes_update, cart_lines_add,
    cart_lines_remove, cart_lines_update, create_cart, get_cart, get_collection_by_handle,
    get_collections, get_product_by_handle, get_product_card, get_products,
};

/// Number of products in the home page recommendation strip.
const RECOMMENDED_PRODUCT_COUNT: i64 = 4;

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Provides type-safe access to products, collections, and cart operations.
/// Products and collections are cached for 5 minutes.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
    cache: Cache<String, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint(),
                access_token: config.storefront_token.clone(),
                cache,
            }),
        }
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(
                "X-Shopify-Storefront-Access-Token",
                self.inner.access_token.expose_secret(),
            )
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                operation = request_body.operation_name,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(graphql_error(format!(
                "HTTP {status}: {}",
                response_text.chars().take(200).collect::<String>()
            )));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    operation = request_body.operation_name,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(convert_graphql_error).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                operation = request_body.operation_name,
                "Shopify GraphQL response has no data and no errors"
            );
            graphql_error("No data in response".to_string())
        })
    }

    /// Execute a cart mutation and unwrap its `{ cart, userErrors }` payload.
    async fn mutate<Q: CartMutation>(&self, variables: Q::Variables) -> Result<Cart, ShopifyError> {
        let data = self.execute::<Q>(variables).await?;

        if let Some(payload) = Q::payload(data) {
            if !payload.user_errors.is_empty() {
                return Err(ShopifyError::UserError(
                    payload
                        .user_errors
                        .into_iter()
                        .map(|e| e.message)
                        .collect::<Vec<_>>()
                        .join("; "),
                ));
            }

            if let Some(cart) = payload.cart {
                return Ok(Cart::from(cart));
            }
        }

        Err(graphql_error(format!("Failed to {}", Q::ACTION)))
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product by its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError> {
        let cache_key = format!("product:{handle}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let variables = get_product_by_handle::Variables {
            handle: handle.to_string(),
        };
        let data = self.execute::<GetProductByHandle>(variables).await?;

        let product = data
            .product
            .map(Product::from)
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {handle}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get the card fields of a product, or `None` if no product has this handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product_card(
        &self,
        handle: &str,
    ) -> Result<Option<ProductSummary>, ShopifyError> {
        let cache_key = format!("product-card:{handle}");

        if let Some(CacheValue::ProductCard(card)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product card");
            return Ok(card.map(|card| *card));
        }

        let variables = get_product_card::Variables {
            handle: handle.to_string(),
        };
        let data = self.execute::<GetProductCard>(variables).await?;
        let card = data.product.map(ProductSummary::from);

        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::ProductCard(card.clone().map(Box::new)),
            )
            .await;

        Ok(card)
    }

    /// Get a page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(
        &self,
        first: i64,
        after: Option<String>,
        sort_key: ProductSortKey,
        reverse: bool,
    ) -> Result<ProductConnection, ShopifyError> {
        let cache_key = format!(
            "products:{first}:{}:{sort_key:?}:{reverse}",
            after.as_deref().unwrap_or("")
        );

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let variables = get_products::Variables {
            first,
            after,
            sort_key,
            reverse,
        };
        let data = self.execute::<GetProducts>(variables).await?;
        let connection = convert_product_connection(data.products);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(connection.clone()))
            .await;

        Ok(connection)
    }

    /// The most recently updated products, used as recommendations.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn get_recommended_products(&self) -> Result<Vec<ProductSummary>, ShopifyError> {
        let connection = self
            .get_products(RECOMMENDED_PRODUCT_COUNT, None, ProductSortKey::UpdatedAt, true)
            .await?;
        Ok(connection.products)
    }

    // =========================================================================
    // Collection Methods
    // =========================================================================

    /// Get a collection by handle with one page of its products.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is not found or the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_collection_by_handle(
        &self,
        handle: &str,
        first: i64,
        after: Option<String>,
    ) -> Result<Collection, ShopifyError> {
        let cache_key = format!(
            "collection:{handle}:{first}:{}",
            after.as_deref().unwrap_or("")
        );

        if let Some(CacheValue::Collection(collection)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for collection");
            return Ok(*collection);
        }

        let variables = get_collection_by_handle::Variables {
            handle: handle.to_string(),
            first,
            after,
        };
        let data = self.execute::<GetCollectionByHandle>(variables).await?;

        let collection = data
            .collection
            .map(Collection::from)
            .ok_or_else(|| ShopifyError::NotFound(format!("Collection not found: {handle}")))?;

        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::Collection(Box::new(collection.clone())),
            )
            .await;

        Ok(collection)
    }

    /// Get a page of collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_collections(
        &self,
        first: i64,
        after: Option<String>,
        sort_key: CollectionSortKey,
        reverse: bool,
    ) -> Result<CollectionConnection, ShopifyError> {
        let cache_key = format!(
            "collections:{first}:{}:{sort_key:?}:{reverse}",
            after.as_deref().unwrap_or("")
        );

        if let Some(CacheValue::Collections(collections)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for collections");
            return Ok(collections);
        }

        let variables = get_collections::Variables {
            first,
            after,
            sort_key,
            reverse,
        };
        let data = self.execute::<GetCollections>(variables).await?;
        let connection = convert_collection_connection(data.collections);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Collections(connection.clone()))
            .await;

        Ok(connection)
    }

    /// The most recently updated collection, featured on the home page.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn get_featured_collection(
        &self,
    ) -> Result<Option<CollectionSummary>, ShopifyError> {
        let connection = self
            .get_collections(1, None, CollectionSortKey::UpdatedAt, true)
            .await?;
        Ok(connection.collections.into_iter().next())
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Get an existing cart, or `None` if it no longer exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError> {
        let variables = get_cart::Variables {
            cart_id: cart_id.clone(),
        };
        let data = self.execute::<GetCart>(variables).await?;
        Ok(data.cart.map(Cart::from))
    }

    /// Create a new cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        self.mutate::<CreateCart>(create_cart::Variables { lines })
            .await
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn add_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        self.mutate::<CartLinesAdd>(cart_lines_add::Variables {
            cart_id: cart_id.clone(),
            lines,
        })
        .await
    }

    /// Update line quantities.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn update_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        self.mutate::<CartLinesUpdate>(cart_lines_update::Variables {
            cart_id: cart_id.clone(),
            lines,
        })
        .await
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or user errors are returned.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id))]
    pub async fn remove_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, ShopifyError> {
        self.mutate::<CartLinesRemove>(cart_lines_remove::Variables {
            cart_id: cart_id.clone(),
            line_ids,
        })
        .await
    }

    /// Replace the cart's discount codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or user errors are returned.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn update_discount_codes(
        &self,
        cart_id: &CartId,
        discount_codes: Vec<String>,
    ) -> Result<Cart, ShopifyError> {
        self.mutate::<CartDiscountCodesUpdate>(cart_discount_codes_update::Variables {
            cart_id: cart_id.clone(),
            discount_codes,
        })
        .await
    }

    /// Replace the cart's gift card codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or user errors are returned.
    #[instrument(skip(self, gift_card_codes), fields(cart_id = %cart_id))]
    pub async fn update_gift_card_codes(
        &self,
        cart_id: &CartId,
        gift_card_codes: Vec<String>,
    ) -> Result<Cart, ShopifyError> {
        self.mutate::<CartGiftCardCodesUpdate>(cart_gift_card_codes_update::Variables {
            cart_id: cart_id.clone(),
            gift_card_codes,
        })
        .await
    }

    /// Remove applied gift cards by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or user errors are returned.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn remove_gift_cards(
        &self,
        cart_id: &CartId,
        applied_gift_card_ids: Vec<GiftCardId>,
    ) -> Result<Cart, ShopifyError> {
        self.mutate::<CartGiftCardCodesRemove>(cart_gift_card_codes_remove::Variables {
            cart_id: cart_id.clone(),
            applied_gift_card_ids,
        })
        .await
    }
}

fn graphql_error(message: String) -> ShopifyError {
    ShopifyError::GraphQL(vec![GraphQLError {
        message,
        locations: vec![],
        path: vec![],
    }])
}

fn convert_graphql_error(error: graphql_client::Error) -> GraphQLError {
    GraphQLError {
        message: error.message,
        locations: error.locations.map_or_else(Vec::new, |locs| {
            locs.into_iter()
                .map(|l| GraphQLErrorLocation {
                    line: i64::from(l.line),
                    column: i64::from(l.column),
                })
                .collect()
        }),
        path: error.path.map_or_else(Vec::new, |p| {
            p.into_iter()
                .map(|fragment| match fragment {
                    graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                    graphql_client::PathFragment::Index(i) => serde_json::Value::Number(i.into()),
                })
                .collect()
        }),
    }
}
