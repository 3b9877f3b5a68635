//! Shopify Storefront API client.
//!
//! # Architecture
//!
//! - Request and response envelopes come from `graphql_client`; each
//!   operation is a hand-written `GraphQLQuery` impl in `queries`
//! - Shopify is the source of truth for catalog and cart state
//! - In-memory caching via `moka` for catalog responses (5 minute TTL);
//!   carts are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use luneva_storefront::shopify::StorefrontClient;
//!
//! let client = StorefrontClient::new(&config.shopify);
//!
//! let product = client.get_product_by_handle("linen-shirt").await?;
//! let cart = client
//!     .create_cart(vec![CartLineInput::new(product.variants[0].id.clone(), 1)])
//!     .await?;
//! ```

mod storefront;
pub mod types;

pub use storefront::StorefrontClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with Shopify APIs.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

impl ShopifyError {
    /// Short message suitable for an inline cart error.
    ///
    /// User errors carry Shopify's own wording (e.g. an invalid discount
    /// code). Everything else collapses to a generic retry prompt.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UserError(message) => message.clone(),
            Self::RateLimited(_) => "Too many requests. Please try again in a moment.".to_string(),
            Self::NotFound(_) => "This cart is no longer available.".to_string(),
            Self::Http(_) | Self::GraphQL(_) | Self::Parse(_) => {
                "Something went wrong updating your cart. Please try again.".to_string()
            }
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
