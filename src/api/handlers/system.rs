use crate::api::models::HealthResponse;
use axum::{extract::State, Json};
use chrono::Utc;
use super::AppState;

/// Handler for GET /health - Liveness probe, no API key required
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        cartoons: state.store.len().await,
        timestamp: Utc::now().to_rfc3339(),
    })
}
