//! [`Launcher`] over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::send;
use crate::config::ClientConfig;
use crate::error::{QueueClientError, Result};
use crate::launcher::{require_address, Launcher};

/// Simulator PCs sit on the shop LAN; anything slower is treated as down.
const LAUNCHER_TIMEOUT: Duration = Duration::from_secs(3);

/// Talks to the launcher service on each simulator PC at
/// `http://{ip}:{port}`.
#[derive(Debug, Clone)]
pub struct HttpLauncher {
    client: Client,
    port: u16,
}

impl HttpLauncher {
    /// # Errors
    ///
    /// Returns [`QueueClientError::Launcher`] if the HTTP client cannot be built.
    pub fn new(port: u16) -> Result<Self> {
        let client = Client::builder()
            .timeout(LAUNCHER_TIMEOUT)
            .build()
            .map_err(|e| QueueClientError::Launcher(e.to_string()))?;
        Ok(Self { client, port })
    }

    /// Launcher on the port from `config`.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.launcher_port)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn post(&self, ip: &str, path: &str) -> Result<()> {
        let ip = require_address(ip)?;
        let url = format!("http://{ip}:{}{path}", self.port);
        debug!(url = %url, "launcher call");
        send(self.client.post(&url)).await.map(drop).map_err(|e| {
            warn!(url = %url, "launcher call failed: {e}");
            QueueClientError::Launcher(e.to_string())
        })
    }
}

#[async_trait]
impl Launcher for HttpLauncher {
    async fn start_autopilot(&self, ip: &str) -> Result<()> {
        self.post(ip, "/autopilot/start").await
    }

    async fn stop_autopilot(&self, ip: &str) -> Result<()> {
        self.post(ip, "/autopilot/stop").await
    }

    async fn kill_session(&self, ip: &str) -> Result<()> {
        self.post(ip, "/session/kill").await
    }
}
