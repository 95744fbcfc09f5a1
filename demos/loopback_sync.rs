//! # Loopback Sync Example
//!
//! Shows how to implement [`Transport`] and [`Connector`] with an
//! in-process channel and watch LiveSync route push messages to topics,
//! then fall back to polling when the "server" hangs up.
//!
//! Useful as a template for:
//!
//! - **Testing** front-desk logic without a backend
//! - **Custom push channels** (SSE, MQTT, a message bus)
//!
//! ## Running
//!
//! ```sh
//! cargo run --example loopback_sync
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use simqueue_client::sync::refresh_fn;
use simqueue_client::{
    Connector, LiveSync, QueueClientError, SyncConfig, SyncEvent, SyncState, Topic, Transport,
};
use tokio::sync::mpsc;

// ─────────────────────────────────────────────────────────────────────
// Step 1: A channel-backed push transport
// ─────────────────────────────────────────────────────────────────────

/// Client half: LiveSync reads push frames from here.
struct LoopbackTransport {
    rx: mpsc::UnboundedReceiver<String>,
}

/// Server half: push frames into the client. Dropping it hangs up.
struct LoopbackServer {
    tx: mpsc::UnboundedSender<String>,
}

fn loopback_pair() -> (LoopbackTransport, LoopbackServer) {
    let (tx, rx) = mpsc::unbounded_channel();
    (LoopbackTransport { rx }, LoopbackServer { tx })
}

#[async_trait]
impl Transport for LoopbackTransport {
    /// `None` once the server half is dropped. Cancel-safe because
    /// `UnboundedReceiver::recv` is.
    async fn recv(&mut self) -> Option<Result<String, QueueClientError>> {
        self.rx.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), QueueClientError> {
        self.rx.close();
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────
// Step 2: A connector that hands out the transport once
// ─────────────────────────────────────────────────────────────────────

/// Accepts the first attempt, refuses every reconnect.
struct OneShotConnector {
    transport: Mutex<Option<LoopbackTransport>>,
}

#[async_trait]
impl Connector for OneShotConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, QueueClientError> {
        let transport = self
            .transport
            .lock()
            .map_err(|_| QueueClientError::TransportClosed)?
            .take();
        match transport {
            Some(transport) => Ok(Box::new(transport)),
            None => Err(QueueClientError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "loopback server is gone",
            ))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Step 3: Topics that count their refreshes
// ─────────────────────────────────────────────────────────────────────

fn counting_topic(name: &'static str, counter: &Arc<AtomicUsize>) -> Topic {
    let counter = Arc::clone(counter);
    let refresh = refresh_fn(move || {
        let counter = Arc::clone(&counter);
        async move {
            let n = counter.fetch_add(1, Ordering::AcqRel) + 1;
            tracing::info!(topic = name, n, "refreshing");
            Ok(())
        }
    });
    let topic = match name {
        "roster" => Topic::roster(refresh),
        _ => Topic::queue(refresh),
    };
    topic.with_poll_interval(Duration::from_millis(300))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (transport, server) = loopback_pair();
    let connector = OneShotConnector {
        transport: Mutex::new(Some(transport)),
    };

    let queue_refreshes = Arc::new(AtomicUsize::new(0));
    let roster_refreshes = Arc::new(AtomicUsize::new(0));
    let config = SyncConfig::new()
        .with_topic(counting_topic("queue", &queue_refreshes))
        .with_topic(counting_topic("roster", &roster_refreshes))
        .with_reconnect_base_delay(Duration::from_millis(200))
        .with_max_reconnect_attempts(2);

    let (mut sync, mut events) = LiveSync::start(connector, config);

    // ── Push phase: each message refreshes its topic ────────────────
    wait_for_state(&mut events, SyncState::Connected).await;
    for kind in ["QUEUE_UPDATE", "TIMED_QUEUE_UPDATE", "PLAYER_UPDATE", "SOMETHING_ELSE"] {
        server
            .tx
            .send(serde_json::json!({ "type": kind }).to_string())?;
    }
    server.tx.send("not json".to_string())?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    tracing::info!(
        queue = queue_refreshes.load(Ordering::Acquire),
        roster = roster_refreshes.load(Ordering::Acquire),
        "after push phase"
    );

    // ── Polling phase: hang up and let the timers take over ─────────
    drop(server);
    wait_for_state(&mut events, SyncState::DegradedPolling).await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    tracing::info!(
        polling = sync.is_polling(),
        queue = queue_refreshes.load(Ordering::Acquire),
        roster = roster_refreshes.load(Ordering::Acquire),
        "after polling phase"
    );

    // ── Clean shutdown ──────────────────────────────────────────────
    sync.shutdown().await;
    while let Some(event) = events.recv().await {
        if event == SyncEvent::Closed {
            tracing::info!("sync closed");
            break;
        }
    }
    Ok(())
}

async fn wait_for_state(events: &mut mpsc::Receiver<SyncEvent>, wanted: SyncState) {
    while let Some(event) = events.recv().await {
        tracing::info!(?event, "event");
        if event == SyncEvent::StateChanged(wanted) {
            return;
        }
    }
}
