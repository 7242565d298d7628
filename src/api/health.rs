use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response structure
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub environment: String,
    pub mail: MailStatus,
    pub generation: String,
}

#[derive(Debug, Serialize)]
pub struct MailStatus {
    /// "configured" when an operator account is set, otherwise "mock".
    pub mode: String,
    pub relay: String,
}

/// Health routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// GET /api/health - Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let mail_mode = if state.config.mail.has_operator_account() {
        "configured"
    } else {
        "mock"
    };

    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        environment: state.config.environment.clone(),
        mail: MailStatus {
            mode: mail_mode.to_string(),
            relay: state.connector.describe(),
        },
        generation: state
            .generator
            .model()
            .unwrap_or("fallback")
            .to_string(),
    })
}
