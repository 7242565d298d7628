use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{error}")]
    Validation {
        error: String,
        details: Option<String>,
    },

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Generation failed: {0}")]
    GenerationFailure(String),

    #[error("Send failed: {0}")]
    SendFailure(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn validation(error: impl Into<String>) -> Self {
        AppError::Validation {
            error: error.into(),
            details: None,
        }
    }

    pub fn validation_with(error: impl Into<String>, details: impl Into<String>) -> Self {
        AppError::Validation {
            error: error.into(),
            details: Some(details.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. }
            | AppError::MissingInput(_)
            | AppError::MissingCredential(_) => StatusCode::BAD_REQUEST,
            AppError::GenerationFailure(_)
            | AppError::SendFailure(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let (error, details) = match self {
            AppError::Validation { error, details } => (error, details),
            AppError::MissingInput(msg) | AppError::MissingCredential(msg) => (msg, None),
            AppError::GenerationFailure(msg) => ("Failed to generate email".to_string(), Some(msg)),
            AppError::SendFailure(msg) => ("Failed to send email".to_string(), Some(msg)),
            AppError::PayloadTooLarge(msg) => ("File too large".to_string(), Some(msg)),
            AppError::NotImplemented(msg) => (msg, None),
            // Never echo internal detail to the caller.
            AppError::InternalError(_) => ("Internal Server Error".to_string(), None),
        };

        let body = Json(json!({
            "success": false,
            "error": error,
            "details": details,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::validation_with("Invalid form data", err.body_text())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::validation_with("Invalid JSON", err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
