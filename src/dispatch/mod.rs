//! Sequential send-and-tally over a resolved recipient list.

pub mod personalize;
pub mod recipients;
pub mod selector;

use serde::Serialize;

use crate::mail::{Attachment, Envelope, MailTransport, TransportCredential};

pub use personalize::{personalize, NAME_PLACEHOLDER};
pub use recipients::{resolve, Recipient, RecipientSource, Resolution};
pub use selector::{select, CallerAccount, TransportChoice};

/// Content shared by every message of one send request.
#[derive(Debug)]
pub struct Campaign {
    pub sender_name: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub success_count: usize,
    pub fail_count: usize,
}

impl DispatchOutcome {
    pub fn attempted(&self) -> usize {
        self.success_count + self.fail_count
    }

    pub fn summary(&self) -> String {
        let mut message = format!("Successfully sent {} email(s)", self.success_count);
        if self.fail_count > 0 {
            message.push_str(&format!(", {} failed", self.fail_count));
        }
        message
    }
}

/// Sends one message per recipient, strictly one after another. A failed
/// recipient is counted and skipped; it is never retried.
pub async fn dispatch(
    transport: &dyn MailTransport,
    credential: &TransportCredential,
    campaign: &Campaign,
    recipients: &[Recipient],
) -> DispatchOutcome {
    let mut outcome = DispatchOutcome::default();

    for recipient in recipients {
        let body = personalize(&campaign.body, recipient);
        let envelope = Envelope {
            from_name: &campaign.sender_name,
            from_address: &credential.identity,
            to: &recipient.address,
            subject: &campaign.subject,
            body: &body,
            attachments: &campaign.attachments,
        };

        match transport.send(&envelope).await {
            Ok(()) => {
                outcome.success_count += 1;
                tracing::debug!(to = %recipient.address, "Email sent");
            }
            Err(e) => {
                outcome.fail_count += 1;
                tracing::error!(
                    to = %recipient.address,
                    error = %credential.redact(&e.to_string()),
                    "Failed to send email"
                );
            }
        }
    }

    tracing::info!(
        sent = outcome.success_count,
        failed = outcome.fail_count,
        "Dispatch finished"
    );

    outcome
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transports shared by the dispatch and API tests.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::mail::{
        Envelope, MailTransport, TransportConnector, TransportCredential, TransportError,
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SentMessage {
        pub from_name: String,
        pub from_address: String,
        pub to: String,
        pub subject: String,
        pub body: String,
        pub attachments: Vec<String>,
    }

    /// Records every envelope; fails for addresses listed in `reject`.
    #[derive(Default, Clone)]
    pub struct RecordingTransport {
        pub sent: Arc<Mutex<Vec<SentMessage>>>,
        pub reject: Vec<String>,
    }

    impl RecordingTransport {
        pub fn rejecting(reject: &[&str]) -> Self {
            Self {
                reject: reject.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }
        }

        pub fn sent(&self) -> Vec<SentMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, envelope: &Envelope<'_>) -> Result<(), TransportError> {
            if self.reject.iter().any(|r| r == envelope.to) {
                return Err(TransportError::Rejected(format!(
                    "550 mailbox unavailable: {}",
                    envelope.to
                )));
            }

            self.sent.lock().unwrap().push(SentMessage {
                from_name: envelope.from_name.to_string(),
                from_address: envelope.from_address.to_string(),
                to: envelope.to.to_string(),
                subject: envelope.subject.to_string(),
                body: envelope.body.to_string(),
                attachments: envelope
                    .attachments
                    .iter()
                    .map(|a| a.filename.clone())
                    .collect(),
            });
            Ok(())
        }
    }

    /// Hands out clones of one `RecordingTransport` and counts connects.
    /// With `connect_error` set, every connect fails with that text.
    #[derive(Default, Clone)]
    pub struct RecordingConnector {
        pub transport: RecordingTransport,
        pub connects: Arc<AtomicUsize>,
        pub identities: Arc<Mutex<Vec<String>>>,
        pub connect_error: Option<String>,
    }

    impl RecordingConnector {
        pub fn with_transport(transport: RecordingTransport) -> Self {
            Self {
                transport,
                ..Default::default()
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                connect_error: Some(message.to_string()),
                ..Default::default()
            }
        }

        pub fn connect_count(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }
    }

    impl TransportConnector for RecordingConnector {
        fn connect(
            &self,
            credential: &TransportCredential,
        ) -> Result<Box<dyn MailTransport>, TransportError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            self.identities
                .lock()
                .unwrap()
                .push(credential.identity.clone());
            if let Some(message) = &self.connect_error {
                return Err(TransportError::Connect(message.clone()));
            }
            Ok(Box::new(self.transport.clone()))
        }

        fn describe(&self) -> String {
            "recording".to_string()
        }
    }
}
