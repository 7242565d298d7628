//! Decides which account the dispatch loop sends through.

use secrecy::{ExposeSecret, SecretString};

use crate::config::MailSettings;
use crate::error::{AppError, Result};
use crate::mail::TransportCredential;

#[derive(Debug)]
pub enum TransportChoice {
    Live(TransportCredential),
    /// No operator account configured: report success without sending.
    Mock,
}

/// Account details supplied by the caller on the send form.
#[derive(Debug)]
pub struct CallerAccount<'a> {
    pub use_own_account: bool,
    pub identity: &'a str,
    pub secret: Option<&'a str>,
}

pub fn select(caller: &CallerAccount<'_>, settings: &MailSettings) -> Result<TransportChoice> {
    if caller.use_own_account {
        let secret = caller.secret.filter(|s| !s.is_empty()).ok_or_else(|| {
            AppError::MissingCredential(
                "Email password required when using your own account".to_string(),
            )
        })?;

        tracing::info!(identity = %caller.identity, "Using caller's own mail account");
        return Ok(TransportChoice::Live(TransportCredential::new(
            caller.identity,
            SecretString::from(secret.to_string()),
        )));
    }

    match (&settings.operator_identity, &settings.operator_secret) {
        (Some(identity), Some(secret)) if !secret.expose_secret().is_empty() => {
            tracing::info!(identity = %identity, "Using operator mail account");
            Ok(TransportChoice::Live(TransportCredential::new(
                identity.clone(),
                SecretString::from(secret.expose_secret().to_string()),
            )))
        }
        _ => {
            tracing::warn!("Mail credentials not configured, dispatch will be mocked");
            Ok(TransportChoice::Mock)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tokio_test::{assert_err, assert_ok};

    fn operator_settings() -> MailSettings {
        MailSettings {
            operator_identity: Some("ops@tooldeck.app".to_string()),
            operator_secret: Some(SecretString::from("ops-pass".to_string())),
            ..Config::default().mail
        }
    }

    fn caller<'a>(use_own_account: bool, secret: Option<&'a str>) -> CallerAccount<'a> {
        CallerAccount {
            use_own_account,
            identity: "alex@x.com",
            secret,
        }
    }

    #[test]
    fn own_account_without_secret_is_rejected() {
        for secret in [None, Some("")] {
            let err = assert_err!(select(&caller(true, secret), &operator_settings()));
            assert!(matches!(err, AppError::MissingCredential(_)));
        }
    }

    #[test]
    fn own_account_uses_caller_credentials() {
        let choice = assert_ok!(select(&caller(true, Some("app-pass")), &operator_settings()));

        match choice {
            TransportChoice::Live(credential) => {
                assert_eq!(credential.identity, "alex@x.com");
                assert_eq!(credential.secret.expose_secret(), "app-pass");
            }
            TransportChoice::Mock => panic!("expected live credentials"),
        }
    }

    #[test]
    fn operator_account_is_used_by_default() {
        let choice = assert_ok!(select(&caller(false, Some("ignored")), &operator_settings()));

        match choice {
            TransportChoice::Live(credential) => {
                assert_eq!(credential.identity, "ops@tooldeck.app");
                assert_eq!(credential.secret.expose_secret(), "ops-pass");
            }
            TransportChoice::Mock => panic!("expected live credentials"),
        }
    }

    #[test]
    fn missing_operator_account_falls_back_to_mock() {
        let settings = Config::default().mail;

        let choice = assert_ok!(select(&caller(false, None), &settings));
        assert!(matches!(choice, TransportChoice::Mock));

        let half_configured = MailSettings {
            operator_identity: Some("ops@tooldeck.app".to_string()),
            ..Config::default().mail
        };
        let choice = assert_ok!(select(&caller(false, None), &half_configured));
        assert!(matches!(choice, TransportChoice::Mock));
    }
}
