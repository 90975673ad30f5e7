use crate::core::error::CatalogError;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};

/// HTTP header carrying the shared secret
pub const API_KEY_HEADER: &str = "api-key";

/// Shared-secret gate for the catalog routes
///
/// - Missing or empty `api-key` header: 403 "api key is not provided!"
/// - Header present but different from the configured key: 403 "invalid api key"
/// - Authentication disabled in config: every request passes
///
/// The configured key is injected into request extensions by the router.
pub async fn api_key_middleware(
    request: Request,
    next: Next,
) -> Result<Response, CatalogError> {
    let api_key = request
        .extensions()
        .get::<ApiKey>()
        .ok_or_else(|| CatalogError::Internal("api key configuration missing".to_string()))?;

    if !api_key.enabled {
        return Ok(next.run(request).await);
    }

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .map(|value| value.as_bytes())
        .filter(|value| !value.is_empty())
        .ok_or(CatalogError::MissingApiKey)?;

    if provided != api_key.key.as_bytes() {
        tracing::warn!("Rejected request with invalid api key");
        return Err(CatalogError::InvalidApiKey);
    }

    Ok(next.run(request).await)
}

/// Extension type for storing API key configuration in request extensions
#[derive(Clone, Debug)]
pub struct ApiKey {
    pub enabled: bool,
    pub key: String,
}

impl ApiKey {
    /// Create a new ApiKey configuration
    pub fn new(enabled: bool, key: String) -> Self {
        Self { enabled, key }
    }
}
