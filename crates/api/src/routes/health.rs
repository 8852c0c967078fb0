use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing::get, Json, Router};
use esgscreen_core::service::StoreHealth;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when screening cannot run.
    pub status: &'static str,
    pub version: &'static str,
    pub store: StoreHealth,
}

/// GET /health -- 200 when the store and parameter catalogue answer, 503
/// otherwise.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.service.store_health().await;
    let (code, status) = if store.is_healthy() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        store,
    };
    (code, Json(body))
}

/// Mount health check routes (root level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
