//! Liveness endpoint.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use serde::Serialize;

use crate::middleware::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since the server started.
    pub uptime: f64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
