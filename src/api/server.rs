//! HTTP Server implementation
//!
//! This module provides the HTTP server using Axum framework with:
//! - Configurable host/port binding
//! - Graceful shutdown handling
//! - Connection limits and request timeouts
//! - Rate limiting, security headers and CORS
//! - A panic boundary returning the internal error envelope

use crate::core::error::ErrorResponse;
use crate::core::Config;
use crate::core::config::{SecurityConfig, ServerConfig};
use crate::api::middleware::{
    request_id_middleware,
    rate_limit_middleware,
    security_headers_middleware,
    ApiKey,
    RateLimiter,
    SecurityHeadersConfig,
    API_KEY_HEADER,
    REQUEST_ID_HEADER,
};
use crate::api::routes::build_api_routes;
use crate::api::handlers::AppState;
use crate::store::CartoonStore;
use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Json,
    Router,
};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower::ServiceBuilder;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// HTTP API Server
pub struct ApiServer {
    router: Router,
    config: ServerConfig,
    rate_limiter: RateLimiter,
}

impl ApiServer {
    /// Create a new API server serving the given catalog
    pub fn new(config: Config, store: Arc<CartoonStore>) -> anyhow::Result<Self> {
        let rate_limiter = RateLimiter::new(
            config.security.rate_limit_requests,
            config.security.rate_limit_window,
        )
        .trust_proxy_headers(config.security.trust_proxy_headers);

        let router = Self::build_router(&config, store, rate_limiter.clone())?;

        Ok(Self {
            router,
            config: config.server,
            rate_limiter,
        })
    }

    /// Build the Axum router with all routes and middleware
    fn build_router(
        config: &Config,
        store: Arc<CartoonStore>,
        rate_limiter: RateLimiter,
    ) -> anyhow::Result<Router> {
        let api_key = ApiKey::new(
            config.security.enable_auth,
            config.security.api_key.clone(),
        );

        let security_headers_config = SecurityHeadersConfig::new(
            config.security.enable_hsts,
            config.security.hsts_max_age,
        );

        let cors = Self::build_cors_layer(&config.security)?;

        let app_state = AppState::new(store);

        // Global layers, outermost first
        let router = build_api_routes(app_state, api_key)
            .layer(
                ServiceBuilder::new()
                    // Request id and span for everything below
                    .layer(middleware::from_fn(request_id_middleware))
                    .layer(TraceLayer::new_for_http())
                    // Security headers also cover 429, 408 and panic responses
                    .layer(middleware::from_fn(move |mut req: Request, next: Next| {
                        let config = security_headers_config.clone();
                        async move {
                            req.extensions_mut().insert(config);
                            security_headers_middleware(req, next).await
                        }
                    }))
                    .layer(cors)
                    .layer(CompressionLayer::new())
                    .layer(middleware::from_fn(move |mut req: Request, next: Next| {
                        let rate_limiter = rate_limiter.clone();
                        async move {
                            req.extensions_mut().insert(rate_limiter);
                            rate_limit_middleware(req, next).await
                        }
                    }))
                    .layer(CatchPanicLayer::custom(handle_panic))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.server.request_timeout,
                    )))
                    .layer(ConcurrencyLimitLayer::new(config.server.max_connections))
            );

        Ok(router)
    }

    /// Build CORS layer from the security configuration
    ///
    /// `*` allows any origin but then credentials cannot be allowed.
    fn build_cors_layer(security: &SecurityConfig) -> anyhow::Result<CorsLayer> {
        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)])
            .expose_headers([
                HeaderName::from_static("ratelimit"),
                HeaderName::from_static("ratelimit-policy"),
                HeaderName::from_static("x-request-id"),
            ]);

        if security.allowed_origins.iter().any(|origin| origin == "*") {
            return Ok(cors.allow_origin(AllowOrigin::any()));
        }

        let origins = security
            .allowed_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {}: {}", origin, e))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(cors.allow_origin(origins).allow_credentials(true))
    }

    /// Start the HTTP server and listen for requests
    ///
    /// This method will block until the server is shut down gracefully.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket_addr: SocketAddr = addr.parse()?;

        info!(
            host = %self.config.host,
            port = self.config.port,
            max_connections = self.config.max_connections,
            request_timeout = self.config.request_timeout,
            "Starting HTTP server"
        );

        // Prune idle clients from the rate limiter once per window
        let rate_limiter = self.rate_limiter.clone();
        let cleanup = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(
                rate_limiter.window_seconds().max(1),
            ));
            loop {
                interval.tick().await;
                rate_limiter.cleanup_expired().await;
            }
        });

        let listener = tokio::net::TcpListener::bind(socket_addr).await?;

        info!(addr = %socket_addr, "HTTP server listening");

        // Connect info feeds the per-IP rate limiter
        let result = axum::serve(
            listener,
            self.router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        cleanup.abort();
        result?;

        info!("HTTP server shut down gracefully");

        Ok(())
    }

    /// Get a reference to the router
    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// Convert a handler panic into the internal error envelope
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(message) = err.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        *message
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %details, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::internal("")),
    )
        .into_response()
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Initiating graceful shutdown...");
}
