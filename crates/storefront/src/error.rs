//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Only failures of critical page data end up here. Deferred data and cart
//! mutations degrade in place and never produce an `AppError`.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::cart::CartError;
use crate::filters;
use crate::sanity::SanityError;
use crate::shopify::ShopifyError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Sanity content API operation failed.
    #[error("Sanity error: {0}")]
    Sanity(#[from] SanityError),

    /// The cart could not be loaded or the request was malformed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Internal(_) | Self::Cart(CartError::Interrupted(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Shopify(ShopifyError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Shopify(ShopifyError::RateLimited(_)) | Self::RateLimited => {
                StatusCode::TOO_MANY_REQUESTS
            }
            Self::Shopify(_) | Self::Sanity(_) | Self::Cart(CartError::Backend(_)) => {
                StatusCode::BAD_GATEWAY
            }
            Self::NotFound(_) | Self::Cart(CartError::Missing) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Cart(CartError::Intent(_)) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to visitors.
    ///
    /// Internal details are never exposed.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) | Self::Cart(CartError::Interrupted(_)) => {
                "Internal server error".to_string()
            }
            Self::Shopify(ShopifyError::NotFound(_)) | Self::NotFound(_) => {
                "We couldn't find that page.".to_string()
            }
            Self::Cart(CartError::Missing) => "Your cart has expired.".to_string(),
            Self::Cart(CartError::Intent(e)) => e.to_string(),
            Self::Cart(CartError::Backend(_)) => "External service error".to_string(),
            Self::Shopify(ShopifyError::RateLimited(_)) | Self::RateLimited => {
                "Too many requests. Please try again shortly.".to_string()
            }
            Self::Shopify(_) | Self::Sanity(_) => "External service error".to_string(),
            Self::BadRequest(_) => self.to_string(),
        }
    }
}

/// Generic error page.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    status: u16,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let message = self.public_message();
        let page = ErrorTemplate {
            status: status.as_u16(),
            message: message.clone(),
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to render error page");
                (status, message).into_response()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Lines updated", Some(&[("key", "LinesUpdate-gid://...")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Shopify(ShopifyError::UserError("x".to_string()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Sanity(SanityError::Status {
                status: 500,
                body: String::new()
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Shopify(ShopifyError::NotFound("p".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::Missing)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::Intent(
                crate::cart::IntentError::ZeroQuantity
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::Interrupted(
                "task panicked".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_public_message_hides_details() {
        let err = AppError::Internal("connection pool exhausted".to_string());
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::Sanity(SanityError::Status {
            status: 401,
            body: "token expired".to_string(),
        });
        assert_eq!(err.public_message(), "External service error");
    }
}
