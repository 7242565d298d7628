//! Service index, endpoint listing, unimplemented placeholders and the
//! catch-all 404.

use axum::extract::OriginalUri;
use axum::http::{Method, StatusCode};
use axum::routing::{any, get};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::state::AppState;

const SERVICE_NAME: &str = "ToolDeck Backend API";

/// Method and path of every route, shared by `/` and `/api/docs`.
const ENDPOINTS: [(&str, &str, &str); 8] = [
    ("GET", "/", "Service index"),
    ("GET", "/api/health", "Liveness and configuration summary"),
    ("GET", "/api/docs", "This listing"),
    ("POST", "/api/email/generate", "Draft an email from context and/or an event image"),
    ("POST", "/api/email/send", "Send to one recipient or a CSV recipient list"),
    ("POST", "/api/whatsapp/link", "Validate a message and build a click-to-chat link"),
    ("POST", "/api/convert", "Not implemented"),
    ("POST", "/api/data", "Not implemented"),
];

pub fn meta_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/api/docs", get(docs))
        .route("/api/convert", any(not_implemented))
        .route("/api/data", any(not_implemented))
}

/// GET / - Service index
async fn index() -> Json<Value> {
    let endpoints: Vec<String> = ENDPOINTS
        .iter()
        .map(|(method, path, _)| format!("{} {}", method, path))
        .collect();

    Json(json!({
        "name": SERVICE_NAME,
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
    }))
}

/// GET /api/docs - Endpoint listing
async fn docs() -> Json<Value> {
    let endpoints: Vec<Value> = ENDPOINTS
        .iter()
        .map(|(method, path, description)| {
            json!({ "method": method, "path": path, "description": description })
        })
        .collect();

    Json(json!({
        "name": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
    }))
}

async fn not_implemented(OriginalUri(uri): OriginalUri) -> Result<Json<Value>> {
    Err(AppError::NotImplemented(format!(
        "{} is not implemented yet",
        uri.path()
    )))
}

/// Fallback for unmatched routes.
pub async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> (StatusCode, Json<Value>) {
    tracing::debug!(%method, path = uri.path(), "Route not found");

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Not Found",
            "code": 404,
            "path": uri.path(),
            "method": method.as_str(),
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}
