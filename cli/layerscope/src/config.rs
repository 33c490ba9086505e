//! Configuration for the CLI.
//!
//! Everything comes from environment variables:
//! - `LAYERSCOPE_USERNAME` / `LAYERSCOPE_PASSWORD`: registry credentials
//! - `LAYERSCOPE_TIMEOUT_SECS`: total HTTP timeout
//! - `LAYERSCOPE_LOG`: log filter (trace, debug, info, warn, error)

use std::time::Duration;

use layerscope_registry::{Credentials, TransportConfig};

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Registry credentials, if both username and password are set.
    pub credentials: Option<Credentials>,

    /// HTTP client settings.
    pub transport: TransportConfig,

    /// Log filter directive.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let credentials = match (lookup("LAYERSCOPE_USERNAME"), lookup("LAYERSCOPE_PASSWORD")) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            _ => None,
        };

        let mut transport = TransportConfig::default();
        if let Some(secs) = lookup("LAYERSCOPE_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            transport.timeout = Duration::from_secs(secs);
        }

        let log_level = lookup("LAYERSCOPE_LOG").unwrap_or_else(|| "warn".to_string());

        Self {
            credentials,
            transport,
            log_level,
        }
    }
}
