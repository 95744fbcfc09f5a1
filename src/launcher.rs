//! Simulator PC device control.
//!
//! Each simulator PC runs a small launcher service reachable at the
//! simulator's configured address. The board calls it opportunistically:
//! failures are logged and shown as a notice, and never block queue flow.

use async_trait::async_trait;

use crate::error::{QueueClientError, Result};

/// Default launcher port on every simulator PC.
pub const DEFAULT_LAUNCHER_PORT: u16 = 8090;

/// Device-control calls addressed by simulator PC address.
#[async_trait]
pub trait Launcher: Send + Sync + 'static {
    /// Put the simulator into attract/autopilot mode.
    async fn start_autopilot(&self, ip: &str) -> Result<()>;

    async fn stop_autopilot(&self, ip: &str) -> Result<()>;

    /// Terminate the running driving session.
    async fn kill_session(&self, ip: &str) -> Result<()>;
}

/// Trimmed, non-empty PC address.
///
/// # Errors
///
/// Returns [`QueueClientError::Validation`] for a blank address.
pub fn require_address(ip: &str) -> Result<&str> {
    let ip = ip.trim();
    if ip.is_empty() {
        return Err(QueueClientError::Validation(
            "simulator has no PC address configured".into(),
        ));
    }
    Ok(ip)
}
