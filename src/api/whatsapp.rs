use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::whatsapp::{self, ComposeRequest, WhatsAppLink};

/// WhatsApp routes
pub fn whatsapp_routes() -> Router<AppState> {
    Router::new().route("/link", post(compose_link))
}

/// POST /api/whatsapp/link - Validate a message and build a click-to-chat link
async fn compose_link(
    payload: std::result::Result<Json<ComposeRequest>, JsonRejection>,
) -> Result<Json<WhatsAppLink>> {
    let Json(request) =
        payload.map_err(|e| AppError::validation_with("Invalid JSON", e.body_text()))?;

    let link = whatsapp::compose(&request).map_err(|errors| {
        let details = errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        AppError::validation_with("Validation Error", details)
    })?;

    tracing::debug!(phone = %link.phone, delay = link.delay_seconds, "WhatsApp link composed");

    Ok(Json(link))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::create_router;
    use crate::config::Config;
    use crate::dispatch::testing::RecordingConnector;
    use crate::generation::GenerationAdapter;
    use crate::state::AppState;

    async fn post_json(payload: &str) -> (StatusCode, Value) {
        let state = AppState::with_parts(
            Config::default(),
            std::sync::Arc::new(RecordingConnector::default()),
            GenerationAdapter::default(),
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/whatsapp/link")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();

        let response = create_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn returns_link_for_valid_request() {
        let payload = json!({
            "phoneNumber": "555 123 4567",
            "countryCode": "+44",
            "message": "See you at 5?",
            "delaySeconds": 10
        });

        let (status, body) = post_json(&payload.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "url": "https://wa.me/445551234567?text=See%20you%20at%205%3F",
                "phone": "+445551234567",
                "delaySeconds": 10
            })
        );
    }

    #[tokio::test]
    async fn lists_every_field_error() {
        let payload = json!({ "phoneNumber": "12", "message": "", "delaySeconds": 90 });

        let (status, body) = post_json(&payload.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation Error");
        let details = body["details"].as_str().unwrap();
        assert!(details.contains("phone: Phone number must be at least 7 digits"));
        assert!(details.contains("message: Message cannot be empty"));
        assert!(details.contains("delay: Delay cannot exceed 60 seconds"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let (status, body) = post_json("{\"phoneNumber\": ").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid JSON");
    }
}
