pub mod smtp;

use async_trait::async_trait;
use axum::body::Bytes;
use secrecy::{ExposeSecret, SecretString};

pub use smtp::SmtpConnector;

const REDACTED: &str = "[REDACTED]";

/// Account used to authenticate against the mail relay.
///
/// Lives for one request only. `Debug` never prints the secret.
#[derive(Debug)]
pub struct TransportCredential {
    pub identity: String,
    pub secret: SecretString,
}

impl TransportCredential {
    pub fn new(identity: impl Into<String>, secret: SecretString) -> Self {
        Self {
            identity: identity.into(),
            secret,
        }
    }

    /// Scrub the secret out of text that is about to be logged or returned.
    pub fn redact(&self, text: &str) -> String {
        redact(text, &self.secret)
    }
}

/// File attached to every message of one dispatch.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: Bytes,
}

/// One outgoing message.
#[derive(Debug, Clone, Copy)]
pub struct Envelope<'a> {
    pub from_name: &'a str,
    pub from_address: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    pub attachments: &'a [Attachment],
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("could not build message: {0}")]
    Build(String),

    #[error("could not reach mail relay: {0}")]
    Connect(String),

    #[error("relay rejected message: {0}")]
    Rejected(String),
}

/// Delivers one message at a time.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, envelope: &Envelope<'_>) -> Result<(), TransportError>;
}

/// Opens a transport authenticated with a per-request credential.
pub trait TransportConnector: Send + Sync {
    fn connect(&self, credential: &TransportCredential)
        -> Result<Box<dyn MailTransport>, TransportError>;

    /// Short label for health output.
    fn describe(&self) -> String;
}

pub fn redact(text: &str, secret: &SecretString) -> String {
    let secret = secret.expose_secret();
    if secret.is_empty() {
        text.to_string()
    } else {
        text.replace(secret, REDACTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_replaces_every_occurrence() {
        let credential = TransportCredential::new(
            "alex@x.com",
            SecretString::from("hunter2".to_string()),
        );

        assert_eq!(
            credential.redact("auth hunter2 failed (pass=hunter2)"),
            "auth [REDACTED] failed (pass=[REDACTED])"
        );
    }

    #[test]
    fn empty_secret_leaves_text_alone() {
        let secret = SecretString::from(String::new());
        assert_eq!(redact("535 bad credentials", &secret), "535 bad credentials");
    }

    #[test]
    fn debug_output_hides_secret() {
        let credential = TransportCredential::new(
            "alex@x.com",
            SecretString::from("hunter2".to_string()),
        );

        let printed = format!("{:?}", credential);
        assert!(printed.contains("alex@x.com"));
        assert!(!printed.contains("hunter2"));
    }
}
