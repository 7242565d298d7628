use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};

use super::form::{FormData, Upload};
use crate::dispatch::{
    self, CallerAccount, Campaign, DispatchOutcome, RecipientSource, TransportChoice,
};
use crate::error::{AppError, Result};
use crate::generation::{GenerationPrompt, InlineImage};
use crate::mail::Attachment;
use crate::models::{GenerateResponse, SendResponse};
use crate::state::AppState;

const MAX_ATTACHMENTS: usize = 5;
const SUPPORTED_IMAGE_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/jpg", "image/webp"];

/// Email routes
pub fn email_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate_email))
        .route("/send", post(send_email))
}

/// How the send form names its recipients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMode {
    Single,
    Bulk,
}

impl SendMode {
    /// A missing mode means bulk, matching the web form's default branch.
    fn parse(value: Option<&str>) -> Result<Self> {
        match value {
            Some(v) if v.eq_ignore_ascii_case("single") => Ok(SendMode::Single),
            Some(v) if v.eq_ignore_ascii_case("bulk") => Ok(SendMode::Bulk),
            None => Ok(SendMode::Bulk),
            Some(other) => Err(AppError::validation_with(
                "Invalid send mode",
                format!("sendMode must be \"single\" or \"bulk\", got {:?}", other),
            )),
        }
    }
}

/// POST /api/email/generate - Draft an email from context and/or an image
async fn generate_email(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>> {
    let mut form = FormData::read(multipart, state.config.max_upload_bytes).await?;

    let context = form.raw("context").map(str::to_string);
    let image = form.take_file("eventImage").map(to_inline_image).transpose()?;

    if context.is_none() && image.is_none() {
        return Err(AppError::validation("Please provide context or image"));
    }

    let message = state
        .generator
        .generate(&GenerationPrompt { context, image })
        .await?;

    Ok(Json(message.into()))
}

fn to_inline_image(upload: Upload) -> Result<InlineImage> {
    let mime_type = upload.content_type.to_ascii_lowercase();
    if !SUPPORTED_IMAGE_TYPES.contains(&mime_type.as_str()) {
        return Err(AppError::validation_with(
            "Unsupported image type",
            format!("{} is not one of PNG, JPEG or WebP", upload.content_type),
        ));
    }

    Ok(InlineImage {
        mime_type,
        data: upload.bytes,
    })
}

/// POST /api/email/send - Send one email or a CSV-driven batch
#[tracing::instrument(name = "Sending email", skip_all)]
async fn send_email(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SendResponse>> {
    let form = FormData::read(multipart, state.config.max_upload_bytes).await?;

    let (Some(sender_email), Some(sender_name), Some(subject), Some(body)) = (
        form.text("senderEmail"),
        form.text("senderName"),
        form.text("subject"),
        form.raw("body"),
    ) else {
        return Err(AppError::validation("Missing required fields"));
    };

    let mode = SendMode::parse(form.text("sendMode"))?;

    let choice = dispatch::select(
        &CallerAccount {
            use_own_account: form.flag("useOwnAccount"),
            identity: sender_email,
            secret: form.raw("senderPassword"),
        },
        &state.config.mail,
    )?;

    let source = match mode {
        SendMode::Single => RecipientSource::Single(form.text("recipientEmail")),
        SendMode::Bulk => RecipientSource::Bulk(form.file("csvFile").map(|f| &f.bytes[..])),
    };
    let resolution = dispatch::resolve(source)?;

    tracing::info!(
        mode = ?mode,
        recipients = resolution.recipients.len(),
        skipped = resolution.skipped_rows(),
        "Recipients resolved"
    );

    let credential = match choice {
        TransportChoice::Live(credential) => credential,
        // Recipients are resolved before this arm, so a mocked send still
        // rejects missing recipient input (a bulk send without a CSV file
        // is a 400 here, not a mock success).
        TransportChoice::Mock => {
            let target = match mode {
                SendMode::Single => resolution
                    .recipients
                    .first()
                    .map(|r| r.address.as_str())
                    .unwrap_or_default(),
                SendMode::Bulk => "multiple recipients",
            };
            let outcome = DispatchOutcome {
                success_count: resolution.recipients.len(),
                fail_count: 0,
            };
            return Ok(Json(SendResponse::new(
                format!("Mock: Email would be sent to {}", target),
                outcome,
                &resolution,
            )));
        }
    };

    let campaign = Campaign {
        sender_name: sender_name.to_string(),
        subject: subject.to_string(),
        body: body.to_string(),
        attachments: (0..MAX_ATTACHMENTS)
            .filter_map(|i| form.file(&format!("attachment{}", i)))
            .map(|upload| Attachment {
                filename: upload.filename.clone(),
                content_type: upload.content_type.clone(),
                content: upload.bytes.clone(),
            })
            .collect(),
    };

    let transport = state
        .connector
        .connect(&credential)
        .map_err(|e| AppError::SendFailure(credential.redact(&e.to_string())))?;

    let outcome =
        dispatch::dispatch(transport.as_ref(), &credential, &campaign, &resolution.recipients)
            .await;

    Ok(Json(SendResponse::new(outcome.summary(), outcome, &resolution)))
}
