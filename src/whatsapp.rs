//! WhatsApp click-to-chat links.
//!
//! The server only validates and composes the link; opening it after the
//! requested delay is left to the client.

use serde::{Deserialize, Serialize};

pub const DEFAULT_COUNTRY_CODE: &str = "+1";
const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;
const MIN_MESSAGE_CHARS: usize = 3;
const MAX_MESSAGE_CHARS: usize = 65_536;
const MAX_DELAY_SECONDS: i64 = 60;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeRequest {
    pub phone_number: String,
    #[serde(default)]
    pub country_code: Option<String>,
    pub message: String,
    #[serde(default)]
    pub delay_seconds: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppLink {
    pub url: String,
    pub phone: String,
    pub delay_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Validates every field and reports all failures at once.
pub fn compose(request: &ComposeRequest) -> Result<WhatsAppLink, Vec<FieldError>> {
    let mut errors = Vec::new();

    let input = request.phone_number.trim();
    let local_digits = digits(input);

    // A bare country code is still "no number".
    let phone_digits = if local_digits.is_empty() {
        String::new()
    } else if input.starts_with('+') {
        local_digits
    } else {
        let country = request
            .country_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COUNTRY_CODE);
        format!("{}{}", digits(country), local_digits)
    };

    if let Err(message) = check_phone(&phone_digits) {
        errors.push(FieldError {
            field: "phone",
            message,
        });
    }

    if let Err(message) = check_message(&request.message) {
        errors.push(FieldError {
            field: "message",
            message,
        });
    }

    let delay = request.delay_seconds.unwrap_or(0);
    if delay < 0 {
        errors.push(FieldError {
            field: "delay",
            message: "Delay cannot be negative",
        });
    } else if delay > MAX_DELAY_SECONDS {
        errors.push(FieldError {
            field: "delay",
            message: "Delay cannot exceed 60 seconds",
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(WhatsAppLink {
        url: format!(
            "https://wa.me/{}?text={}",
            phone_digits,
            urlencoding::encode(&request.message)
        ),
        phone: format!("+{}", phone_digits),
        delay_seconds: delay as u64,
    })
}

fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

fn check_phone(digits: &str) -> Result<(), &'static str> {
    match digits.len() {
        0 => Err("Phone number is required"),
        n if n < MIN_PHONE_DIGITS => Err("Phone number must be at least 7 digits"),
        n if n > MAX_PHONE_DIGITS => Err("Phone number is too long"),
        _ => Ok(()),
    }
}

fn check_message(message: &str) -> Result<(), &'static str> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        Err("Message cannot be empty")
    } else if trimmed.chars().count() < MIN_MESSAGE_CHARS {
        Err("Message must be at least 3 characters")
    } else if message.chars().count() > MAX_MESSAGE_CHARS {
        Err("Message is too long")
    } else {
        Ok(())
    }
}
