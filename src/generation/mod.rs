//! Email drafting: a generative-text service when a key is configured,
//! otherwise a fixed invitation template.

pub mod gemini;

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use serde::{Deserialize, Serialize};

use crate::config::GenerationSettings;
use crate::error::{AppError, Result};

pub use gemini::GeminiClient;

const FALLBACK_SUBJECT: &str = "Your Event Invitation";
const SUBJECT_MAX_CHARS: usize = 50;

pub const SYSTEM_INSTRUCTION: &str = "You are an expert professional email writer specializing in event invitations and organizational communications. Your task is to create engaging, well-structured emails that are:
- Clear and concise
- Professional yet friendly
- Action-oriented with clear CTAs
- Properly formatted with sections
- Free of jargon unless specified
Always return ONLY valid JSON in the exact format: {\"subject\": \"...\", \"body\": \"...\"}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedMessage {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct GenerationPrompt {
    pub context: Option<String>,
    pub image: Option<InlineImage>,
}

/// What is handed to the service for one call.
#[derive(Debug)]
pub struct GenerationRequest<'a> {
    pub system_instruction: &'a str,
    pub prompt: String,
    pub image: Option<&'a InlineImage>,
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Raw reply text for one prompt.
    async fn complete(&self, request: &GenerationRequest<'_>) -> Result<String>;

    fn model(&self) -> &str;
}

#[derive(Clone, Default)]
pub struct GenerationAdapter {
    service: Option<Arc<dyn GenerationService>>,
}

impl GenerationAdapter {
    pub fn new(service: Option<Arc<dyn GenerationService>>) -> Self {
        Self { service }
    }

    pub fn from_settings(settings: &GenerationSettings) -> Result<Self> {
        let service = match &settings.api_key {
            Some(key) => {
                let client = GeminiClient::new(&settings.base_url, &settings.model, key)?;
                Some(Arc::new(client) as Arc<dyn GenerationService>)
            }
            None => None,
        };
        Ok(Self::new(service))
    }

    /// Model name in use, or `None` when running on the fallback template.
    pub fn model(&self) -> Option<&str> {
        self.service.as_deref().map(|s| s.model())
    }

    pub async fn generate(&self, prompt: &GenerationPrompt) -> Result<GeneratedMessage> {
        let context = prompt.context.as_deref().map(str::trim).filter(|c| !c.is_empty());

        let Some(service) = &self.service else {
            tracing::warn!("GEMINI_API_KEY not configured, using template response");
            return Ok(fallback_message(context));
        };

        let request = GenerationRequest {
            system_instruction: SYSTEM_INSTRUCTION,
            prompt: build_prompt(context),
            image: prompt.image.as_ref(),
        };

        tracing::info!(
            model = service.model(),
            with_image = request.image.is_some(),
            "Requesting email draft"
        );

        let raw = service.complete(&request).await?;
        parse_reply(&raw)
    }
}

fn build_prompt(context: Option<&str>) -> String {
    format!(
        r#"Generate a professional email for the following event:

Context: {}

Requirements:
1. Subject line: Engaging and concise (max 60 characters)
2. Email body should include:
   - Warm greeting
   - Clear event description
   - Key details (use placeholders like [DATE], [TIME], [VENUE], [LINK] if not provided)
   - Strong call-to-action
   - Professional sign-off
3. Match the tone to the context (formal for corporate, casual for student events, etc.)
4. Keep the email concise but informative (150-300 words)

Return ONLY JSON: {{"subject": "your subject here", "body": "your email body here"}}"#,
        context.unwrap_or("See the attached event image.")
    )
}

/// Deterministic draft used when no service key is configured.
pub fn fallback_message(context: Option<&str>) -> GeneratedMessage {
    let subject = context
        .and_then(|c| c.split('.').next())
        .map(|first| first.chars().take(SUBJECT_MAX_CHARS).collect::<String>())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_SUBJECT.to_string());

    let description =
        context.unwrap_or("Join us for an amazing experience that you won't want to miss.");

    let body = format!(
        "Dear Team,

We are excited to invite you to our upcoming event!

{description}

Event Details:
- Date: [Please add date]
- Time: [Please add time]
- Venue: [Please add venue]
- Registration: [Please add link]

We look forward to seeing you there!

Best regards,
The Event Team"
    );

    GeneratedMessage { subject, body }
}

/// Parses the span from the first `{` to the last `}` of a reply, so prose
/// or code fences around the object are ignored.
pub fn parse_reply(raw: &str) -> Result<GeneratedMessage> {
    let span = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => {
            return Err(AppError::GenerationFailure(
                "Invalid AI response format".to_string(),
            ))
        }
    };

    serde_json::from_str(span)
        .map_err(|e| AppError::GenerationFailure(format!("Invalid AI response JSON: {}", e)))
}
