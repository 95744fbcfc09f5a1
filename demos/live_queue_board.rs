//! # Live Queue Board Example
//!
//! A terminal front desk: keeps every simulator's queue live and prints who
//! is driving and who is next whenever something changes.
//!
//! 1. Read API, push and launcher settings from the environment
//! 2. Optionally log in (autopilot needs a seller session)
//! 3. Wire the board's refreshers into LiveSync topics
//! 4. Print the board on every push message or poll-driven change
//! 5. Shut down gracefully on Ctrl+C
//!
//! ## Running
//!
//! ```sh
//! # Backend on localhost:3000 and push channel on localhost:8080, then:
//! cargo run --example live_queue_board
//!
//! # Point at a shop server and log in:
//! SIMQUEUE_API_URL=http://192.168.0.10:3000 \
//! SIMQUEUE_WS_URL=ws://192.168.0.10:8080 \
//! SIMQUEUE_EMAIL=caixa@pista.local SIMQUEUE_PASSWORD=secret \
//!     cargo run --example live_queue_board
//! ```

use std::sync::Arc;
use std::time::Duration;

use simqueue_client::{
    ClientConfig, HttpBackend, HttpLauncher, LiveSync, MemorySessionStore, QueueBoard, SyncConfig,
    SyncEvent, SyncState, Topic, WebSocketConnector,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    // Set `RUST_LOG=simqueue_client=debug` to watch reconnects and polls.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Configuration ───────────────────────────────────────────────
    let config = ClientConfig::from_env()?;
    tracing::info!(api = %config.api_base_url, push = %config.push_url, "starting front desk");

    let session = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(HttpBackend::new(&config, session.clone())?);

    if let (Ok(email), Ok(password)) = (
        std::env::var("SIMQUEUE_EMAIL"),
        std::env::var("SIMQUEUE_PASSWORD"),
    ) {
        let logged_in = backend.login(&email, &password).await?;
        tracing::info!(user = %logged_in.user.name, role = ?logged_in.user.role, "logged in");
    }

    let launcher = Arc::new(HttpLauncher::from_config(&config)?);
    let board = Arc::new(QueueBoard::new(backend.clone(), session).with_launcher(launcher));

    // ── Live sync ───────────────────────────────────────────────────
    let sync_config = SyncConfig::new()
        .with_topic(Topic::queue(board.queue_refresher()))
        .with_topic(Topic::roster(board.roster_refresher()));
    let connector =
        WebSocketConnector::new(config.push_url.clone()).with_connect_timeout(Duration::from_secs(5));
    let (mut sync, mut events) = LiveSync::start(connector, sync_config);

    // Initial load does not wait for the first push message.
    if let Err(e) = board.refresh_queues().await {
        tracing::warn!("initial load failed: {e}");
    }
    if let Err(e) = board.refresh_roster().await {
        tracing::warn!("initial roster load failed: {e}");
    }
    let ticker = board.spawn_countdown();
    print_board(&board).await;

    // ── Event loop ──────────────────────────────────────────────────
    let mut redraw = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(SyncEvent::StateChanged(state)) => {
                        tracing::info!(?state, "sync state changed");
                        if state == SyncState::DegradedPolling {
                            tracing::warn!("push channel down, polling until it is back");
                        }
                    }
                    Some(SyncEvent::Message(kind)) => {
                        tracing::debug!(%kind, "push message");
                    }
                    Some(SyncEvent::RefreshFailed { topic, message }) => {
                        tracing::warn!(%topic, "refresh failed: {message}");
                    }
                    Some(SyncEvent::Closed) | None => break,
                }
            }
            _ = redraw.tick() => {
                print_board(&board).await;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, shutting down");
                break;
            }
        }
    }

    // ── Clean shutdown ──────────────────────────────────────────────
    board.close();
    sync.shutdown().await;
    ticker.abort();
    backend.logout().await;
    Ok(())
}

async fn print_board(board: &QueueBoard) {
    if let Some(notice) = board.notice().await {
        println!("[{:?}] {}", notice.level, notice.message);
        board.dismiss_notice().await;
    }
    for sim in board.views().await {
        let driving = match &sim.view.current {
            Some(current) => format!(
                "{} ({})",
                current.entry.player.name,
                current.countdown().unwrap_or_else(|| "--:--".to_string())
            ),
            None => "livre".to_string(),
        };
        let next: Vec<&str> = sim
            .view
            .upcoming
            .iter()
            .map(|upcoming| upcoming.entry.player.name.as_str())
            .collect();
        println!("{:<12} {:<24} próximos: {}", sim.simulator.name, driving, next.join(", "));
    }
}
