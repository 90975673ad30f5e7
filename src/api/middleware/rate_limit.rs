use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Message returned with 429 responses
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

/// Rate limiter using sliding window algorithm
///
/// Request timestamps are tracked per client IP. A request is rejected with
/// 429 when the client already made `max_requests` requests inside the
/// window; otherwise it is recorded and let through.
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<RwLock<RateLimiterState>>,
    max_requests: usize,
    window_duration: Duration,
    /// Read the client IP from X-Forwarded-For / X-Real-IP before the socket
    trust_proxy_headers: bool,
}

struct RateLimiterState {
    requests: HashMap<IpAddr, Vec<Instant>>,
}

/// Quota left for a client after a request was admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: usize,
    pub remaining: usize,
    /// Seconds until the oldest request in the window expires
    pub reset_after: u64,
    pub window_seconds: u64,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `max_requests` - Maximum number of requests allowed per window
    /// * `window_seconds` - Time window duration in seconds
    pub fn new(max_requests: usize, window_seconds: u64) -> Self {
        Self {
            state: Arc::new(RwLock::new(RateLimiterState {
                requests: HashMap::new(),
            })),
            max_requests,
            window_duration: Duration::from_secs(window_seconds),
            trust_proxy_headers: false,
        }
    }

    /// Take the client IP from proxy headers when present
    pub fn trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    /// Window length in seconds
    pub fn window_seconds(&self) -> u64 {
        self.window_duration.as_secs()
    }

    /// Admit or reject one request from `ip`
    pub async fn check_rate_limit(&self, ip: IpAddr) -> Result<RateLimitStatus, RateLimitError> {
        let mut state = self.state.write().await;
        let now = Instant::now();

        let requests = state.requests.entry(ip).or_default();
        requests.retain(|&timestamp| now.duration_since(timestamp) < self.window_duration);

        if requests.len() >= self.max_requests {
            return Err(RateLimitError::LimitExceeded(RateLimitStatus {
                limit: self.max_requests,
                remaining: 0,
                reset_after: self.reset_after(requests, now),
                window_seconds: self.window_seconds(),
            }));
        }

        requests.push(now);

        Ok(RateLimitStatus {
            limit: self.max_requests,
            remaining: self.max_requests - requests.len(),
            reset_after: self.reset_after(requests, now),
            window_seconds: self.window_seconds(),
        })
    }

    /// Seconds until the oldest recorded request leaves the window, at least 1
    fn reset_after(&self, requests: &[Instant], now: Instant) -> u64 {
        requests
            .first()
            .map(|&oldest| {
                let expires_at = oldest + self.window_duration;
                let remaining = expires_at.saturating_duration_since(now);
                remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
            })
            .unwrap_or_else(|| self.window_seconds())
            .max(1)
    }

    /// Drop clients with no requests inside the window
    pub async fn cleanup_expired(&self) {
        let mut state = self.state.write().await;
        let now = Instant::now();

        state.requests.retain(|_, requests| {
            requests.retain(|&timestamp| now.duration_since(timestamp) < self.window_duration);
            !requests.is_empty()
        });
    }

    /// Number of clients currently tracked
    pub async fn tracked_clients(&self) -> usize {
        self.state.read().await.requests.len()
    }
}

/// Rate limiting errors
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// Client used its whole quota for the current window
    #[error("rate limit of {} requests per {}s exceeded", .0.limit, .0.window_seconds)]
    LimitExceeded(RateLimitStatus),
    /// No limiter was injected into the request
    #[error("rate limiter configuration missing")]
    ConfigurationError,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        match self {
            RateLimitError::LimitExceeded(status) => {
                let body = Json(json!({
                    "message": RATE_LIMIT_MESSAGE,
                    "success": false,
                }));

                let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
                insert_rate_limit_headers(response.headers_mut(), &status);
                response.headers_mut().insert(
                    "Retry-After",
                    HeaderValue::from(status.reset_after),
                );
                response
            }
            RateLimitError::ConfigurationError => {
                let body = Json(json!({
                    "message": "rate limiter configuration missing",
                    "success": false,
                    "data": null,
                }));

                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

/// Write the IETF draft-8 `RateLimit-Policy` and `RateLimit` headers
fn insert_rate_limit_headers(headers: &mut HeaderMap, status: &RateLimitStatus) {
    let policy = format!("{}-in-{}s", status.limit, status.window_seconds);

    if let Ok(value) = HeaderValue::from_str(&format!(
        "\"{}\"; q={}; w={}",
        policy, status.limit, status.window_seconds
    )) {
        headers.insert("RateLimit-Policy", value);
    }

    if let Ok(value) = HeaderValue::from_str(&format!(
        "\"{}\"; r={}; t={}",
        policy, status.remaining, status.reset_after
    )) {
        headers.insert("RateLimit", value);
    }
}

/// Rate limiting middleware
///
/// The limiter is injected via request extensions. Admitted responses carry
/// the standard rate limit headers; rejected ones add `Retry-After`.
pub async fn rate_limit_middleware(
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    let rate_limiter = request
        .extensions()
        .get::<RateLimiter>()
        .cloned()
        .ok_or(RateLimitError::ConfigurationError)?;

    let client_ip = extract_client_ip(&request, rate_limiter.trust_proxy_headers);

    let status = match rate_limiter.check_rate_limit(client_ip).await {
        Ok(status) => status,
        Err(err) => {
            tracing::warn!(client_ip = %client_ip, "Rate limit exceeded");
            return Err(err);
        }
    };

    let mut response = next.run(request).await;
    insert_rate_limit_headers(response.headers_mut(), &status);
    Ok(response)
}

/// Extract client IP address from request
///
/// With `trust_proxy_headers`, the first X-Forwarded-For entry or X-Real-IP
/// wins. Otherwise the peer socket address is used. Requests served without
/// connection info (in-process tests) count as localhost.
fn extract_client_ip(request: &Request, trust_proxy_headers: bool) -> IpAddr {
    if trust_proxy_headers {
        let forwarded = request
            .headers()
            .get("X-Forwarded-For")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());

        let real_ip = || {
            request
                .headers()
                .get("X-Real-IP")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<IpAddr>().ok())
        };

        if let Some(ip) = forwarded.or_else(real_ip) {
            return ip;
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::from([127, 0, 0, 1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::util::ServiceExt; // For oneshot method

    fn app(limiter: RateLimiter) -> Router {
        Router::new()
            .route("/cartoons", get(|| async { "OK" }))
            .layer(middleware::from_fn(move |mut req: Request<Body>, next: Next| {
                let limiter = limiter.clone();
                async move {
                    req.extensions_mut().insert(limiter);
                    rate_limit_middleware(req, next).await
                }
            }))
    }

    fn get_cartoons() -> Request<Body> {
        Request::builder()
            .uri("/cartoons")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_rate_limiter_counts_down_remaining() {
        let limiter = RateLimiter::new(3, 900);
        let ip = IpAddr::from([127, 0, 0, 1]);

        let remaining: Vec<usize> = vec![
            limiter.check_rate_limit(ip).await.unwrap().remaining,
            limiter.check_rate_limit(ip).await.unwrap().remaining,
            limiter.check_rate_limit(ip).await.unwrap().remaining,
        ];
        assert_eq!(remaining, vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn test_rate_limiter_blocks_requests_exceeding_limit() {
        let limiter = RateLimiter::new(2, 900);
        let ip = IpAddr::from([127, 0, 0, 1]);

        assert!(limiter.check_rate_limit(ip).await.is_ok());
        assert!(limiter.check_rate_limit(ip).await.is_ok());

        match limiter.check_rate_limit(ip).await {
            Err(RateLimitError::LimitExceeded(status)) => {
                assert_eq!(status.limit, 2);
                assert_eq!(status.remaining, 0);
                assert_eq!(status.window_seconds, 900);
                assert!(status.reset_after > 0 && status.reset_after <= 900);
            }
            other => panic!("Expected LimitExceeded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_limiter_different_ips_independent() {
        let limiter = RateLimiter::new(1, 60);
        let ip1 = IpAddr::from([10, 0, 0, 1]);
        let ip2 = IpAddr::from([10, 0, 0, 2]);

        assert!(limiter.check_rate_limit(ip1).await.is_ok());
        assert!(limiter.check_rate_limit(ip1).await.is_err());
        assert!(limiter.check_rate_limit(ip2).await.is_ok());
    }

    #[tokio::test]
    async fn test_rate_limiter_sliding_window() {
        let limiter = RateLimiter::new(1, 1);
        let ip = IpAddr::from([127, 0, 0, 1]);

        assert!(limiter.check_rate_limit(ip).await.is_ok());
        assert!(limiter.check_rate_limit(ip).await.is_err());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert!(limiter.check_rate_limit(ip).await.is_ok());
    }

    #[tokio::test]
    async fn test_rate_limiter_cleanup_expired() {
        let limiter = RateLimiter::new(5, 1);

        limiter.check_rate_limit(IpAddr::from([10, 0, 0, 1])).await.unwrap();
        limiter.check_rate_limit(IpAddr::from([10, 0, 0, 2])).await.unwrap();
        assert_eq!(limiter.tracked_clients().await, 2);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        limiter.cleanup_expired().await;

        assert_eq!(limiter.tracked_clients().await, 0);
    }

    #[tokio::test]
    async fn test_middleware_sets_standard_headers() {
        let app = app(RateLimiter::new(100, 900));

        let response = app.oneshot(get_cartoons()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let policy = response.headers().get("RateLimit-Policy").unwrap().to_str().unwrap();
        assert_eq!(policy, "\"100-in-900s\"; q=100; w=900");

        let limit = response.headers().get("RateLimit").unwrap().to_str().unwrap();
        assert!(limit.starts_with("\"100-in-900s\"; r=99; t="));
    }

    #[tokio::test]
    async fn test_middleware_rejects_with_429() {
        let app = app(RateLimiter::new(1, 60));

        app.clone().oneshot(get_cartoons()).await.unwrap();
        let response = app.oneshot(get_cartoons()).await.unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("Retry-After"));
        assert!(response.headers().contains_key("RateLimit"));

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["message"], RATE_LIMIT_MESSAGE);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_extract_client_ip_from_proxy_headers() {
        let request = Request::builder()
            .uri("/cartoons")
            .header("X-Forwarded-For", "192.168.1.100, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_client_ip(&request, true), IpAddr::from([192, 168, 1, 100]));

        let request = Request::builder()
            .uri("/cartoons")
            .header("X-Real-IP", "192.168.1.200")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_client_ip(&request, true), IpAddr::from([192, 168, 1, 200]));
    }

    #[tokio::test]
    async fn test_proxy_headers_ignored_unless_trusted() {
        let mut request = Request::builder()
            .uri("/cartoons")
            .header("X-Forwarded-For", "192.168.1.100")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([203, 0, 113, 7], 51000))));

        assert_eq!(extract_client_ip(&request, false), IpAddr::from([203, 0, 113, 7]));
    }

    #[tokio::test]
    async fn test_extract_client_ip_default() {
        assert_eq!(
            extract_client_ip(&get_cartoons(), false),
            IpAddr::from([127, 0, 0, 1])
        );
    }
}
