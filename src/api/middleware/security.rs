use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Policy sent with every response; the API serves JSON only
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self';base-uri 'self';font-src 'self' https: data:;form-action 'self';frame-ancestors 'self';img-src 'self' data:;object-src 'none';script-src 'self';script-src-attr 'none';style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests";

/// Headers that never depend on configuration
const STATIC_HEADERS: [(&str, &str); 11] = [
    ("Content-Security-Policy", CONTENT_SECURITY_POLICY),
    ("Cross-Origin-Opener-Policy", "same-origin"),
    ("Cross-Origin-Resource-Policy", "same-origin"),
    ("Origin-Agent-Cluster", "?1"),
    ("Referrer-Policy", "no-referrer"),
    ("X-Content-Type-Options", "nosniff"),
    ("X-DNS-Prefetch-Control", "off"),
    ("X-Download-Options", "noopen"),
    ("X-Frame-Options", "DENY"),
    ("X-Permitted-Cross-Domain-Policies", "none"),
    // Legacy XSS auditors do more harm than good, so switch them off
    ("X-XSS-Protection", "0"),
];

/// Security headers middleware
///
/// Adds the hardening header set to every response, including error and
/// rate-limited ones. `Strict-Transport-Security` is added only when enabled
/// in the [`SecurityHeadersConfig`] found in request extensions.
pub async fn security_headers_middleware(
    request: Request,
    next: Next,
) -> Response {
    let security_config = request
        .extensions()
        .get::<SecurityHeadersConfig>()
        .cloned();

    let mut response = next.run(request).await;
    apply_security_headers(response.headers_mut(), security_config.as_ref());
    response
}

fn apply_security_headers(headers: &mut HeaderMap, config: Option<&SecurityHeadersConfig>) {
    for (name, value) in STATIC_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }

    if let Some(config) = config.filter(|config| config.enable_hsts) {
        let hsts_value = format!("max-age={}; includeSubDomains", config.hsts_max_age);
        if let Ok(value) = HeaderValue::from_str(&hsts_value) {
            headers.insert("Strict-Transport-Security", value);
        }
    }

    // Do not advertise the server stack
    headers.remove("X-Powered-By");
}

/// Configuration for security headers
#[derive(Clone, Debug)]
pub struct SecurityHeadersConfig {
    /// Enable HSTS (HTTP Strict Transport Security) header
    pub enable_hsts: bool,
    /// HSTS max-age in seconds
    pub hsts_max_age: u64,
}

impl SecurityHeadersConfig {
    pub fn new(enable_hsts: bool, hsts_max_age: u64) -> Self {
        Self {
            enable_hsts,
            hsts_max_age,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        middleware,
        routing::get,
        Router,
    };
    use tower::util::ServiceExt; // For oneshot method

    fn app(config: Option<SecurityHeadersConfig>) -> Router {
        Router::new()
            .route("/cartoons", get(|| async { "OK" }))
            .layer(middleware::from_fn(move |mut req: Request<Body>, next: Next| {
                let config = config.clone();
                async move {
                    if let Some(config) = config {
                        req.extensions_mut().insert(config);
                    }
                    security_headers_middleware(req, next).await
                }
            }))
    }

    fn request() -> Request<Body> {
        Request::builder()
            .uri("/cartoons")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_all_static_headers_present() {
        let response = app(None).oneshot(request()).await.unwrap();

        for (name, value) in STATIC_HEADERS {
            assert_eq!(
                response.headers().get(name).unwrap(),
                value,
                "Unexpected value for {}",
                name
            );
        }
        assert!(!response.headers().contains_key("Strict-Transport-Security"));
    }

    #[tokio::test]
    async fn test_hsts_enabled() {
        let config = SecurityHeadersConfig::new(true, 31536000);
        let response = app(Some(config)).oneshot(request()).await.unwrap();

        assert_eq!(
            response.headers().get("Strict-Transport-Security").unwrap(),
            "max-age=31536000; includeSubDomains"
        );
    }

    #[tokio::test]
    async fn test_hsts_disabled() {
        let config = SecurityHeadersConfig::new(false, 31536000);
        let response = app(Some(config)).oneshot(request()).await.unwrap();

        assert!(!response.headers().contains_key("Strict-Transport-Security"));
        assert_eq!(response.headers().get("X-Frame-Options").unwrap(), "DENY");
    }

    #[tokio::test]
    async fn test_headers_added_to_not_found() {
        let response = app(None)
            .oneshot(
                Request::builder()
                    .uri("/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get("X-XSS-Protection").unwrap(), "0");
    }
}
