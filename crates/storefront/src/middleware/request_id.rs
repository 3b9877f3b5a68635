//! Request ID propagation.
//!
//! An upstream proxy's `x-request-id` is reused when it looks sane;
//! otherwise a UUID v4 is generated. The id is recorded on the request span,
//! tagged in Sentry and echoed in the response.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_INCOMING_LEN: usize = 128;

/// The incoming request id, if present and made of safe characters.
fn incoming_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_INCOMING_LEN
                && id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        })
        .map(str::to_string)
}

pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id =
        incoming_request_id(request.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_incoming_id_is_reused_when_safe() {
        assert_eq!(
            incoming_request_id(&headers("cf-8a1b2c3d.eu")).as_deref(),
            Some("cf-8a1b2c3d.eu")
        );
    }

    #[test]
    fn test_unsafe_incoming_id_is_ignored() {
        assert!(incoming_request_id(&headers("abc def")).is_none());
        assert!(incoming_request_id(&headers("")).is_none());
        assert!(incoming_request_id(&headers(&"a".repeat(200))).is_none());
        assert!(incoming_request_id(&HeaderMap::new()).is_none());
    }
}
