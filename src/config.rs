use std::env;

use secrecy::{ExposeSecret, SecretString};

/// Origins always allowed besides `FRONTEND_URL`.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "https://tool-deck.vercel.app",
    "http://localhost:3000",
    "http://localhost:5173",
];

#[derive(Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub frontend_url: String,
    pub log_format: LogFormat,
    pub max_upload_bytes: usize,
    pub mail: MailSettings,
    pub generation: GenerationSettings,
}

/// Mail relay plus the optional operator account used when the caller
/// does not bring their own.
#[derive(Debug)]
pub struct MailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub operator_identity: Option<String>,
    pub operator_secret: Option<SecretString>,
}

#[derive(Debug)]
pub struct GenerationSettings {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Config::default();

        Ok(Config {
            server_host: var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: match var("PORT") {
                Some(port) => port.parse().map_err(|_| ConfigError::InvalidPort)?,
                None => defaults.server_port,
            },
            environment: var("APP_ENV").unwrap_or(defaults.environment),
            frontend_url: var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            log_format: match var("LOG_FORMAT").as_deref() {
                None | Some("pretty") => LogFormat::Pretty,
                Some("json") => LogFormat::Json,
                Some(other) => return Err(ConfigError::InvalidLogFormat(other.to_string())),
            },
            max_upload_bytes: match var("MAX_UPLOAD_BYTES") {
                Some(bytes) => bytes
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber("MAX_UPLOAD_BYTES"))?,
                None => defaults.max_upload_bytes,
            },
            mail: MailSettings {
                smtp_host: var("SMTP_HOST").unwrap_or(defaults.mail.smtp_host),
                smtp_port: match var("SMTP_PORT") {
                    Some(port) => port
                        .parse()
                        .map_err(|_| ConfigError::InvalidNumber("SMTP_PORT"))?,
                    None => defaults.mail.smtp_port,
                },
                operator_identity: var("EMAIL_USER"),
                operator_secret: var("EMAIL_PASS").map(SecretString::from),
            },
            generation: GenerationSettings {
                api_key: var("GEMINI_API_KEY").map(SecretString::from),
                model: var("GEMINI_MODEL").unwrap_or(defaults.generation.model),
                base_url: var("GEMINI_BASE_URL").unwrap_or(defaults.generation.base_url),
            },
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// `FRONTEND_URL` followed by the fixed origins, without duplicates.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = vec![self.frontend_url.clone()];
        for origin in DEFAULT_ALLOWED_ORIGINS {
            if !origins.iter().any(|o| o == origin) {
                origins.push(origin.to_string());
            }
        }
        origins
    }

    /// Whole-request body cap: the CSV file, five attachments and the form
    /// fields, each file bounded by `max_upload_bytes`.
    pub fn max_request_bytes(&self) -> usize {
        self.max_upload_bytes.saturating_mul(7)
    }
}

impl MailSettings {
    pub fn has_operator_account(&self) -> bool {
        self.operator_identity.is_some()
            && self
                .operator_secret
                .as_ref()
                .is_some_and(|s| !s.expose_secret().is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            environment: "development".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            log_format: LogFormat::Pretty,
            max_upload_bytes: 10 * 1024 * 1024,
            mail: MailSettings {
                smtp_host: "smtp.gmail.com".to_string(),
                smtp_port: 587,
                operator_identity: None,
                operator_secret: None,
            },
            generation: GenerationSettings {
                api_key: None,
                model: "gemini-2.5-flash".to_string(),
                base_url: "https://generativelanguage.googleapis.com".to_string(),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server port")]
    InvalidPort,
    #[error("{0} must be a number")]
    InvalidNumber(&'static str),
    #[error("LOG_FORMAT must be \"pretty\" or \"json\", got {0:?}")]
    InvalidLogFormat(String),
}
