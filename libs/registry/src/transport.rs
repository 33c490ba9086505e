//! HTTP transport construction.

use std::time::Duration;

use reqwest::Client;

/// Configuration for the registry HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Total request timeout.
    pub timeout: Duration,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),        // 5 minutes
            connect_timeout: Duration::from_secs(30), // 30 seconds
            user_agent: format!("layerscope/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Build the HTTP client shared by the manifest client and the authenticator.
pub fn build_client(config: &TransportConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.as_str())
        .pool_max_idle_per_host(10)
        .build()
}
