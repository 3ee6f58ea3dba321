//! Health check handler

use axum::{Json, extract::State};

use crate::web::{AppState, responses::HealthResponse};

/// Liveness check with uptime and cache occupancy
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Health check",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let cached_images = state.cache.lock().await.len();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (chrono::Utc::now() - state.start_time).num_seconds(),
        cached_images,
    })
}
