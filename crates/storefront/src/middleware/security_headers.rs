//! Security headers.
//!
//! The content security policy is built per request: inline styles are
//! allowed only under the request's nonce. Content images, video and font
//! files load from the Sanity CDN, product images from the Shopify CDN, and
//! HTMX from unpkg.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;

/// Build the policy for a nonce. An empty nonce allows no inline styles.
#[must_use]
pub fn content_security_policy(nonce: &str) -> String {
    let style_src = if nonce.is_empty() {
        "style-src 'self'".to_string()
    } else {
        format!("style-src 'self' 'nonce-{nonce}'")
    };

    [
        "default-src 'none'",
        "script-src 'self' https://unpkg.com",
        style_src.as_str(),
        "font-src 'self' https://cdn.sanity.io",
        "img-src 'self' data: https://cdn.sanity.io https://cdn.shopify.com",
        "media-src 'self' https://cdn.sanity.io",
        "connect-src 'self'",
        "frame-src 'none'",
        "object-src 'none'",
        "base-uri 'self'",
        "form-action 'self'",
        "frame-ancestors 'none'",
        "upgrade-insecure-requests",
    ]
    .join("; ")
}

/// Add security headers to every response.
///
/// `Cache-Control: no-store` is applied only when the handler (or the
/// static file layer) did not set its own caching policy.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let nonce = request
        .extensions()
        .get::<CspNonce>()
        .map(|nonce| nonce.value().to_string())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    match HeaderValue::from_str(&content_security_policy(&nonce)) {
        Ok(policy) => {
            headers.insert(CONTENT_SECURITY_POLICY, policy);
        }
        Err(e) => tracing::error!(error = %e, "Invalid CSP header value"),
    }

    // Video sections autoplay and may go fullscreen.
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), \
             autoplay=(self), \
             browsing-topics=(), \
             camera=(), \
             display-capture=(), \
             fullscreen=(self), \
             geolocation=(), \
             gyroscope=(), \
             interest-cohort=(), \
             magnetometer=(), \
             microphone=(), \
             payment=(), \
             usb=()",
        ),
    );

    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );
    // The CDNs do not send CORP headers.
    headers.insert(
        HeaderName::from_static("cross-origin-embedder-policy"),
        HeaderValue::from_static("credentialless"),
    );

    response
}
