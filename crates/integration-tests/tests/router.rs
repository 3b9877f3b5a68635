//! The assembled application and its middleware stack.
//!
//! Only routes that answer without contacting Shopify or Sanity are
//! exercised here.
//!
//! Run with: cargo test -p luneva-integration-tests --test router

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use luneva_integration_tests::test_config;
use luneva_storefront::routes::app;
use luneva_storefront::state::AppState;
use tower::ServiceExt;

fn router() -> Router {
    app(AppState::new(test_config()))
}

async fn get(path: &str) -> Response {
    router()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_answers_ok_with_security_headers() {
    let response = get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    let policy = headers[header::CONTENT_SECURITY_POLICY].to_str().unwrap();
    assert!(policy.contains("'nonce-"));
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_incoming_request_id_is_echoed() {
    let response = router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "edge-7f3a")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "edge-7f3a");
}

#[tokio::test]
async fn test_each_response_gets_a_fresh_nonce() {
    let first = get("/health").await;
    let second = get("/health").await;

    assert_ne!(
        first.headers()[header::CONTENT_SECURITY_POLICY],
        second.headers()[header::CONTENT_SECURITY_POLICY]
    );
}

#[tokio::test]
async fn test_cart_count_without_a_session_cart_renders_no_badge() {
    let response = get("/cart/count").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.trim().is_empty());
}

#[tokio::test]
async fn test_checkout_without_a_cart_returns_to_the_cart_page() {
    let response = get("/checkout").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/cart");
}

#[tokio::test]
async fn test_account_without_hosted_accounts_redirects_home() {
    let response = get("/account").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let response = get("/account/logout").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let response = get("/does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
}
