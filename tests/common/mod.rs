#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing,
    dead_code
)]
//! Shared test utilities for SimQueue Client integration tests.
//!
//! Provides a channel-driven [`MockTransport`], a scripted [`MockConnector`],
//! an in-memory [`MockBackend`], and JSON builders for backend payloads.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use simqueue_client::model::{EntryId, NormalizedStatus, Player, SimulatorId, SimulatorQueue};
use simqueue_client::protocol::{AddToQueueBody, CreatePlayerBody};
use simqueue_client::{Backend, Connector, Launcher, QueueClientError, Refresh, Transport};
use tokio::sync::mpsc;

// ── MockTransport ───────────────────────────────────────────────────

type Incoming = Option<Result<String, QueueClientError>>;

/// A push transport fed by its [`MockLink`].
///
/// `recv` yields whatever the link pushes; once the link is dropped it
/// hangs forever so the session stays open until shutdown.
pub struct MockTransport {
    incoming: mpsc::UnboundedReceiver<Incoming>,
    closed: Arc<AtomicBool>,
}

/// The test's end of a [`MockTransport`].
#[derive(Clone)]
pub struct MockLink {
    tx: mpsc::UnboundedSender<Incoming>,
    pub closed: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new() -> (Self, MockLink) {
        let (tx, incoming) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));
        let transport = Self {
            incoming,
            closed: Arc::clone(&closed),
        };
        (transport, MockLink { tx, closed })
    }
}

impl MockLink {
    /// Push a text frame from the backend.
    pub fn push(&self, text: impl Into<String>) {
        let _ = self.tx.send(Some(Ok(text.into())));
    }

    /// Fail the connection with a receive error.
    pub fn fail(&self, reason: &str) {
        let _ = self
            .tx
            .send(Some(Err(QueueClientError::TransportReceive(reason.into()))));
    }

    /// Close the connection cleanly from the backend side.
    pub fn hang_up(&self) {
        let _ = self.tx.send(None);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn recv(&mut self) -> Option<Result<String, QueueClientError>> {
        match self.incoming.recv().await {
            Some(item) => item,
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), QueueClientError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

// ── MockConnector ───────────────────────────────────────────────────

/// What the next connection attempt does.
pub enum Attempt {
    Accept(MockTransport),
    Refuse,
    /// Never completes; only the connect timeout ends it.
    Hang,
}

/// Plays back scripted connection attempts in order. Once the script is
/// exhausted every attempt is refused.
#[derive(Clone)]
pub struct MockConnector {
    script: Arc<StdMutex<VecDeque<Attempt>>>,
    attempts: Arc<AtomicUsize>,
}

impl MockConnector {
    pub fn new(script: Vec<Attempt>) -> Self {
        Self {
            script: Arc::new(StdMutex::new(VecDeque::from(script))),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A connector that never gets through.
    pub fn refusing() -> Self {
        Self::new(Vec::new())
    }

    /// Number of `connect` calls so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, QueueClientError> {
        self.attempts.fetch_add(1, Ordering::AcqRel);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Attempt::Accept(transport)) => Ok(Box::new(transport)),
            Some(Attempt::Hang) => std::future::pending().await,
            Some(Attempt::Refuse) | None => Err(QueueClientError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
        }
    }
}

// ── Refresh counters ────────────────────────────────────────────────

/// A topic callback that counts invocations and optionally fails.
#[derive(Clone, Default)]
pub struct CountingRefresh {
    count: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl CountingRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::Release);
    }
}

#[async_trait]
impl Refresh for CountingRefresh {
    async fn refresh(&self) -> Result<(), QueueClientError> {
        self.count.fetch_add(1, Ordering::AcqRel);
        if self.fail.load(Ordering::Acquire) {
            return Err(QueueClientError::Request("backend unreachable".into()));
        }
        Ok(())
    }
}

// ── MockBackend ─────────────────────────────────────────────────────

/// In-memory [`Backend`] recording every mutating call.
#[derive(Default)]
pub struct MockBackend {
    simulators: StdMutex<Vec<SimulatorQueue>>,
    statuses: StdMutex<HashMap<SimulatorId, NormalizedStatus>>,
    players: StdMutex<Vec<Player>>,
    failing_status: StdMutex<HashSet<SimulatorId>>,
    simulator_delays: StdMutex<VecDeque<Duration>>,
    fail_simulators: AtomicBool,
    fail_actions: AtomicBool,
    fail_players: AtomicBool,
    player_fetches: AtomicUsize,
    calls: StdMutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_simulators(&self, simulators: Vec<SimulatorQueue>) {
        *self.simulators.lock().unwrap() = simulators;
    }

    pub fn set_status(&self, simulator: SimulatorId, status: NormalizedStatus) {
        self.statuses.lock().unwrap().insert(simulator, status);
    }

    pub fn set_players(&self, players: Vec<Player>) {
        *self.players.lock().unwrap() = players;
    }

    pub fn fail_status_for(&self, simulator: SimulatorId) {
        self.failing_status.lock().unwrap().insert(simulator);
    }

    /// Delay the next `fetch_simulators` calls, one entry per call.
    pub fn delay_simulators(&self, delays: Vec<Duration>) {
        self.simulator_delays.lock().unwrap().extend(delays);
    }

    pub fn set_fail_simulators(&self, fail: bool) {
        self.fail_simulators.store(fail, Ordering::Release);
    }

    pub fn set_fail_actions(&self, fail: bool) {
        self.fail_actions.store(fail, Ordering::Release);
    }

    pub fn set_fail_players(&self, fail: bool) {
        self.fail_players.store(fail, Ordering::Release);
    }

    pub fn player_fetches(&self) -> usize {
        self.player_fetches.load(Ordering::Acquire)
    }

    /// Mutating calls, e.g. `"move 11 -> 3"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Players as the backend sees them, including registered ones.
    pub fn players(&self) -> Vec<Player> {
        self.players.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), QueueClientError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_actions.load(Ordering::Acquire) {
            return Err(QueueClientError::Http {
                status: 500,
                message: "Erro interno".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn fetch_simulators(&self) -> Result<Vec<SimulatorQueue>, QueueClientError> {
        let snapshot = self.simulators.lock().unwrap().clone();
        let delay = self.simulator_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_simulators.load(Ordering::Acquire) {
            return Err(QueueClientError::Request("connection reset".into()));
        }
        Ok(snapshot)
    }

    async fn fetch_status(
        &self,
        simulator: SimulatorId,
    ) -> Result<NormalizedStatus, QueueClientError> {
        if self.failing_status.lock().unwrap().contains(&simulator) {
            return Err(QueueClientError::Http {
                status: 503,
                message: "turn engine down".into(),
            });
        }
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(&simulator)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_players(&self) -> Result<Vec<Player>, QueueClientError> {
        self.player_fetches.fetch_add(1, Ordering::AcqRel);
        if self.fail_players.load(Ordering::Acquire) {
            return Err(QueueClientError::Request("connection reset".into()));
        }
        Ok(self.players.lock().unwrap().clone())
    }

    async fn create_player(&self, body: &CreatePlayerBody) -> Result<Player, QueueClientError> {
        self.record(format!(
            "register {} by {}",
            body.email,
            body.seller_id.unwrap_or(0)
        ))?;
        let mut players = self.players.lock().unwrap();
        let id = players.iter().map(|player| player.id).max().unwrap_or(0) + 1;
        let player = Player {
            id,
            name: body.name.clone(),
            email: body.email.clone(),
            phone: body.phone.clone(),
            ..Player::default()
        };
        players.push(player.clone());
        Ok(player)
    }

    async fn add_to_queue(&self, body: &AddToQueueBody) -> Result<(), QueueClientError> {
        self.record(format!("add {} -> {}", body.player_id, body.simulator_id))
    }

    async fn remove_from_queue(&self, entry: EntryId) -> Result<(), QueueClientError> {
        self.record(format!("remove {entry}"))
    }

    async fn move_to_position(&self, entry: EntryId, position: i64) -> Result<(), QueueClientError> {
        self.record(format!("move {entry} -> {position}"))
    }

    async fn confirm_turn(&self, entry: EntryId) -> Result<(), QueueClientError> {
        self.record(format!("confirm {entry}"))
    }

    async fn advance(&self, simulator: SimulatorId) -> Result<(), QueueClientError> {
        self.record(format!("next {simulator}"))
    }

    async fn start_turns(&self, simulator: SimulatorId) -> Result<(), QueueClientError> {
        self.record(format!("start {simulator}"))
    }

    async fn mark_missed(&self, entry: EntryId) -> Result<(), QueueClientError> {
        self.record(format!("missed {entry}"))
    }
}

// ── MockLauncher ────────────────────────────────────────────────────

/// Records launcher calls; fails all of them when `failing` is set.
#[derive(Default)]
pub struct MockLauncher {
    pub calls: StdMutex<Vec<String>>,
    pub failing: AtomicBool,
}

impl MockLauncher {
    fn record(&self, call: String) -> Result<(), QueueClientError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::Acquire) {
            return Err(QueueClientError::Launcher("PC offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Launcher for MockLauncher {
    async fn start_autopilot(&self, ip: &str) -> Result<(), QueueClientError> {
        self.record(format!("autopilot start {ip}"))
    }

    async fn stop_autopilot(&self, ip: &str) -> Result<(), QueueClientError> {
        self.record(format!("autopilot stop {ip}"))
    }

    async fn kill_session(&self, ip: &str) -> Result<(), QueueClientError> {
        self.record(format!("kill {ip}"))
    }
}

// ── JSON builders ───────────────────────────────────────────────────

/// A push message of the given type.
pub fn push_json(kind: &str) -> String {
    json!({ "type": kind }).to_string()
}

/// A nested player record.
pub fn player_json(id: u64, name: &str) -> Value {
    json!({ "id": id, "name": name, "email": format!("{}@pista.local", name.to_lowercase()) })
}

/// A queue entry using the `Player` key.
pub fn entry_json(id: u64, player_id: u64, name: &str) -> Value {
    json!({ "id": id, "Player": player_json(player_id, name) })
}

/// A simulator with its nested queue.
pub fn simulator_json(id: u64, name: &str, queue: Vec<Value>) -> Value {
    json!({ "id": id, "name": name, "Queue": queue })
}

/// One turn engine snapshot.
pub fn active_item_json(
    entry_id: u64,
    player_id: u64,
    status: &str,
    time_left_ms: Option<u64>,
    position: i64,
) -> Value {
    json!({
        "id": entry_id,
        "player": { "id": player_id },
        "status": status,
        "timeLeft": time_left_ms,
        "position": position,
    })
}

/// Parse simulators through the normal wire path.
pub fn simulators_from(value: Value) -> Vec<SimulatorQueue> {
    simqueue_client::protocol::parse_simulators(value).unwrap()
}

/// Parse a status payload through the normal wire path.
pub fn status_from(value: Value) -> NormalizedStatus {
    simqueue_client::protocol::normalize_status(value)
}

/// Install a test subscriber honoring `RUST_LOG` (default `info`). Safe to
/// call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
