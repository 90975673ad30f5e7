use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// HTTP header name for the request id
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Longest incoming request id that is reused as-is
const MAX_REQUEST_ID_LEN: usize = 128;

/// Middleware that assigns every request an id and propagates it
/// through the request lifecycle.
///
/// The id is:
/// - Taken from an incoming `X-Request-Id` header when it is usable
/// - Otherwise generated as a UUID v4
/// - Stored in request extensions as [`RequestId`]
/// - Attached to every log entry through the `http_request` span
/// - Echoed back in the response headers
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = incoming_request_id(&request)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
        version = ?request.version(),
    );

    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = async move {
        let started = Instant::now();
        tracing::debug!("Request started");

        let response = next.run(request).await;

        tracing::info!(
            status = %response.status(),
            latency_ms = started.elapsed().as_millis() as u64,
            "Request completed"
        );

        response
    }
    .instrument(span)
    .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn incoming_request_id(request: &Request) -> Option<String> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && value.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
}

/// Extension type for storing the request id in request extensions
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        response::IntoResponse,
        routing::get,
        Router,
    };
    use tower::util::ServiceExt; // For oneshot method

    async fn echo_request_id(request: Request<Body>) -> impl IntoResponse {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|id| id.as_str().to_string())
            .unwrap_or_else(|| "no-request-id".to_string());

        (StatusCode::OK, request_id)
    }

    fn app() -> Router {
        Router::new()
            .route("/cartoons", get(echo_request_id))
            .layer(middleware::from_fn(request_id_middleware))
    }

    fn header_id(response: &Response) -> String {
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_generates_uuid_when_absent() {
        let request = Request::builder()
            .uri("/cartoons")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert!(Uuid::parse_str(&header_id(&response)).is_ok());
    }

    #[tokio::test]
    async fn test_honours_incoming_request_id() {
        let request = Request::builder()
            .uri("/cartoons")
            .header(REQUEST_ID_HEADER, "frontend-42")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(header_id(&response), "frontend-42");

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body_bytes[..], b"frontend-42");
    }

    #[tokio::test]
    async fn test_oversized_request_id_replaced() {
        let request = Request::builder()
            .uri("/cartoons")
            .header(REQUEST_ID_HEADER, "x".repeat(MAX_REQUEST_ID_LEN + 1))
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert!(Uuid::parse_str(&header_id(&response)).is_ok());
    }

    #[tokio::test]
    async fn test_request_id_unique_per_request() {
        let app = app();

        let first = app
            .clone()
            .oneshot(Request::builder().uri("/cartoons").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let second = app
            .oneshot(Request::builder().uri("/cartoons").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_ne!(header_id(&first), header_id(&second));
    }
}
