//! Client configuration.

use std::time::Duration;

use crate::ClientError;

/// WebSocket endpoint of a locally running chat server.
pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:8000/api/v1/realtime/ws";
/// Room API base of a locally running chat server.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/v1/realtime";

/// Environment variable overriding [`ClientConfig::ws_url`].
pub const ENV_WS_URL: &str = "PARLOR_WS_URL";
/// Environment variable overriding [`ClientConfig::api_url`].
pub const ENV_API_URL: &str = "PARLOR_API_URL";
/// Environment variable overriding [`ClientConfig::http_timeout`], in seconds.
pub const ENV_HTTP_TIMEOUT_SECS: &str = "PARLOR_HTTP_TIMEOUT_SECS";

/// Where the client connects and how patient it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket endpoint carrying envelopes.
    pub ws_url: String,
    /// Base URL the room directory paths are appended to.
    pub api_url: String,
    /// Upper bound on each room directory request.
    ///
    /// Default: 10 seconds.
    pub http_timeout: Duration,
    /// How many transport events may be buffered before the connection
    /// task waits for the client loop.
    ///
    /// Default: 256.
    pub event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout: Duration::from_secs(10),
            event_capacity: 256,
        }
    }
}

impl ClientConfig {
    /// Defaults, overridden by `PARLOR_WS_URL`, `PARLOR_API_URL` and
    /// `PARLOR_HTTP_TIMEOUT_SECS` where set.
    ///
    /// # Errors
    /// Returns [`ClientError::Config`] if the timeout is not a whole number
    /// of seconds.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_WS_URL) {
            config.ws_url = url;
        }
        if let Some(url) = lookup(ENV_API_URL) {
            config.api_url = url;
        }
        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!("{ENV_HTTP_TIMEOUT_SECS}={raw:?} is not a number of seconds"))
            })?;
            config.http_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}
