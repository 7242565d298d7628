//! SMTP transport backed by lettre.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;

use super::{Envelope, MailTransport, TransportConnector, TransportCredential, TransportError};
use crate::config::MailSettings;

/// Port on which relays expect TLS from the first byte.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Builds relay transports for the configured host: implicit TLS on 465,
/// STARTTLS everywhere else.
#[derive(Debug, Clone)]
pub struct SmtpConnector {
    host: String,
    port: u16,
}

impl SmtpConnector {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn from_settings(settings: &MailSettings) -> Self {
        Self::new(settings.smtp_host.clone(), settings.smtp_port)
    }

    pub fn implicit_tls(&self) -> bool {
        self.port == IMPLICIT_TLS_PORT
    }
}

impl TransportConnector for SmtpConnector {
    fn connect(
        &self,
        credential: &TransportCredential,
    ) -> Result<Box<dyn MailTransport>, TransportError> {
        let creds = Credentials::new(
            credential.identity.clone(),
            credential.secret.expose_secret().to_owned(),
        );

        let builder = if self.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
        };

        let transport = builder
            .map_err(|e| TransportError::Connect(credential.redact(&e.to_string())))?
            .port(self.port)
            .credentials(creds)
            .build();

        tracing::debug!(
            host = %self.host,
            port = self.port,
            implicit_tls = self.implicit_tls(),
            "SMTP transport ready"
        );

        Ok(Box::new(SmtpTransport { transport }))
    }

    fn describe(&self) -> String {
        let scheme = if self.implicit_tls() { "smtps" } else { "smtp" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, envelope: &Envelope<'_>) -> Result<(), TransportError> {
        let message = build_message(envelope)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| TransportError::Rejected(e.to_string()))?;

        Ok(())
    }
}

fn parse_address(address: &str) -> Result<Address, TransportError> {
    address
        .trim()
        .parse()
        .map_err(|e: lettre::address::AddressError| TransportError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// Plain-text body, switched to `multipart/mixed` when files are attached.
pub fn build_message(envelope: &Envelope<'_>) -> Result<Message, TransportError> {
    let from_name = envelope.from_name.trim();
    let from = Mailbox::new(
        (!from_name.is_empty()).then(|| from_name.to_string()),
        parse_address(envelope.from_address)?,
    );
    let to = Mailbox::new(None, parse_address(envelope.to)?);

    let builder = Message::builder()
        .from(from)
        .to(to)
        .subject(envelope.subject);

    let message = if envelope.attachments.is_empty() {
        builder
            .header(ContentType::TEXT_PLAIN)
            .body(envelope.body.to_string())
    } else {
        let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(envelope.body.to_string()));
        for attachment in envelope.attachments {
            let content_type = ContentType::parse(&attachment.content_type)
                .or_else(|_| ContentType::parse("application/octet-stream"))
                .map_err(|e| TransportError::Build(e.to_string()))?;
            parts = parts.singlepart(
                MailAttachment::new(attachment.filename.clone())
                    .body(attachment.content.to_vec(), content_type),
            );
        }
        builder.multipart(parts)
    };

    message.map_err(|e| TransportError::Build(e.to_string()))
}
