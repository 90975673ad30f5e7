//! API routes

use crate::api::handlers::{
    delete_cartoon, get_cartoon, list_cartoons,
    health_check,
    AppState,
};
use crate::api::middleware::{api_key_middleware, ApiKey};
use axum::{
    extract::Request,
    middleware::{self, Next},
    routing::get,
    Router,
};

/// Liveness probe path, the only route served without an api key
pub const HEALTH_PATH: &str = "/health";

/// Build the API routes
///
/// The api-key gate wraps the whole router, so unknown paths and unrouted
/// methods are rejected with 403 before any 404/405. Only `/health` skips it.
pub fn build_api_routes(state: AppState, api_key: ApiKey) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health_check))
        .route("/cartoons", get(list_cartoons))
        .route("/cartoons/:id", get(get_cartoon).delete(delete_cartoon))
        .with_state(state)
        .layer(middleware::from_fn(move |mut req: Request, next: Next| {
            let api_key = api_key.clone();
            async move {
                if req.uri().path() == HEALTH_PATH {
                    return Ok(next.run(req).await);
                }
                req.extensions_mut().insert(api_key);
                api_key_middleware(req, next).await
            }
        }))
}
