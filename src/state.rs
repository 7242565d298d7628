use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::Result;
use crate::generation::GenerationAdapter;
use crate::mail::{SmtpConnector, TransportConnector};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub connector: Arc<dyn TransportConnector>,
    pub generator: Arc<GenerationAdapter>,
    pub started_at: Instant,
}

impl AppState {
    /// Wires the SMTP connector and the generation adapter from `config`.
    pub fn new(config: Config) -> Result<Self> {
        let connector = SmtpConnector::from_settings(&config.mail);
        let generator = GenerationAdapter::from_settings(&config.generation)?;
        Ok(Self::with_parts(config, Arc::new(connector), generator))
    }

    pub fn with_parts(
        config: Config,
        connector: Arc<dyn TransportConnector>,
        generator: GenerationAdapter,
    ) -> Self {
        Self {
            config: Arc::new(config),
            connector,
            generator: Arc::new(generator),
            started_at: Instant::now(),
        }
    }
}
