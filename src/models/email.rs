use serde::Serialize;

use crate::dispatch::{DispatchOutcome, Resolution};
use crate::generation::GeneratedMessage;

/// Body of a successful `POST /api/email/generate`.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub subject: String,
    pub body: String,
}

impl From<GeneratedMessage> for GenerateResponse {
    fn from(message: GeneratedMessage) -> Self {
        Self {
            success: true,
            subject: message.subject,
            body: message.body,
        }
    }
}

/// Body of a successful `POST /api/email/send`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
    pub parsed_rows: usize,
    pub skipped_rows: usize,
}

impl SendResponse {
    pub fn new(message: String, outcome: DispatchOutcome, resolution: &Resolution) -> Self {
        Self {
            success: true,
            message,
            outcome,
            parsed_rows: resolution.parsed_rows,
            skipped_rows: resolution.skipped_rows(),
        }
    }
}
