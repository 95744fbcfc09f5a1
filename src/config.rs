//! Endpoint configuration.
//!
//! [`ClientConfig`] carries the addresses of the REST API, the push
//! endpoint and the simulator PC launcher. LiveSync tuning lives in
//! [`SyncConfig`](crate::sync::SyncConfig).

use std::time::Duration;

use crate::error::{QueueClientError, Result};
use crate::launcher::DEFAULT_LAUNCHER_PORT;

/// Environment variable overriding [`ClientConfig::api_base_url`].
pub const ENV_API_URL: &str = "SIMQUEUE_API_URL";
/// Environment variable overriding [`ClientConfig::push_url`].
pub const ENV_WS_URL: &str = "SIMQUEUE_WS_URL";
/// Environment variable overriding [`ClientConfig::launcher_port`].
pub const ENV_LAUNCHER_PORT: &str = "SIMQUEUE_LAUNCHER_PORT";

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_PUSH_URL: &str = "ws://localhost:8080";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the client talks to.
///
/// # Example
///
/// ```
/// use simqueue_client::config::ClientConfig;
///
/// let config = ClientConfig::new().with_api_base_url("http://10.0.0.2:3000/");
/// assert_eq!(config.api_base_url, "http://10.0.0.2:3000");
/// assert_eq!(config.launcher_port, 8090);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST API root, without a trailing slash.
    ///
    /// Defaults to **`http://localhost:3000`**.
    pub api_base_url: String,
    /// Push channel URL. Defaults to **`ws://localhost:8080`**.
    pub push_url: String,
    /// Port the launcher listens on, on every simulator PC.
    ///
    /// Defaults to **8090**.
    pub launcher_port: u16,
    /// Per-request timeout for REST calls. Defaults to **10 seconds**.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            push_url: DEFAULT_PUSH_URL.to_string(),
            launcher_port: DEFAULT_LAUNCHER_PORT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Defaults overridden by `SIMQUEUE_API_URL`, `SIMQUEUE_WS_URL` and
    /// `SIMQUEUE_LAUNCHER_PORT`. Blank variables are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`QueueClientError::Validation`] if the launcher port is not a
    /// valid port number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`QueueClientError::Validation`] for an unparsable port.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::new();
        if let Some(url) = get(ENV_API_URL) {
            config = config.with_api_base_url(url);
        }
        if let Some(url) = get(ENV_WS_URL) {
            config = config.with_push_url(url);
        }
        if let Some(raw) = get(ENV_LAUNCHER_PORT) {
            let port = raw.parse::<u16>().map_err(|e| {
                QueueClientError::Validation(format!("{ENV_LAUNCHER_PORT}={raw:?}: {e}"))
            })?;
            config.launcher_port = port;
        }
        Ok(config)
    }

    /// Set the REST API root. A trailing slash is stripped.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_push_url(mut self, url: impl Into<String>) -> Self {
        self.push_url = url.into();
        self
    }

    #[must_use]
    pub fn with_launcher_port(mut self, port: u16) -> Self {
        self.launcher_port = port;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
