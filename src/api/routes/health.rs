//! Health check endpoint

use axum::Json;
use axum::extract::State;

use crate::api::state::EventsState;
use crate::api::types::HealthResponse;

/// GET /health
pub async fn health_check(State(state): State<EventsState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        channels: state.len(),
    })
}
