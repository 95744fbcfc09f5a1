//! Push-with-polling-fallback live update channel.
//!
//! [`LiveSync`] keeps a set of [`Topic`]s eventually consistent. It prefers a
//! push transport opened through a [`Connector`]; whenever the channel is
//! unavailable it falls back to one poll timer per topic and keeps trying to
//! reconnect with exponential backoff (1 s, 2 s, 4 s by default, three
//! attempts). A successful reconnect stops the poll timers again.
//!
//! Transport errors never surface as errors; they only move the state
//! machine. Refresh callback failures are reported as
//! [`SyncEvent::RefreshFailed`] and leave the channel untouched.
//!
//! # Example
//!
//! ```rust,ignore
//! let board = Arc::new(QueueBoard::new(backend));
//! let config = SyncConfig::new()
//!     .with_topic(Topic::queue(board.queue_refresher()))
//!     .with_topic(Topic::roster(board.roster_refresher()));
//! let (mut sync, mut events) = LiveSync::start(WebSocketConnector::new(url), config);
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         SyncEvent::RefreshFailed { message, .. } => show_banner(message),
//!         SyncEvent::Closed => break,
//!         _ => {}
//!     }
//! }
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::event::{SyncEvent, SyncState};
use crate::protocol::{PushKind, PushMessage};
use crate::transport::{Connector, Transport};

/// Name of the queue topic.
pub const QUEUE_TOPIC: &str = "queue";

/// Name of the player roster topic.
pub const ROSTER_TOPIC: &str = "roster";

/// Poll cadence of the queue topic while degraded.
pub const DEFAULT_QUEUE_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Poll cadence of the roster topic while degraded.
pub const DEFAULT_ROSTER_POLL_INTERVAL: Duration = Duration::from_secs(5);

const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 3;
const DEFAULT_RECONNECT_BASE_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Poll intervals are clamped to at least this (tokio rejects a zero period).
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

// ── Refresh callbacks ───────────────────────────────────────────────

/// A topic's refresh callback.
///
/// Invoked for every matching push message and every poll tick. Errors are
/// caught by [`LiveSync`] and reported, never propagated.
#[async_trait]
pub trait Refresh: Send + Sync + 'static {
    /// Re-fetch the topic's data from the backend.
    async fn refresh(&self) -> Result<()>;
}

/// Adapter turning an async closure into a [`Refresh`].
pub struct RefreshFn<F>(F);

/// Wrap `f` so it can be registered as a topic callback.
///
/// ```
/// use simqueue_client::sync::{refresh_fn, Topic};
/// use std::time::Duration;
///
/// let topic = Topic::new("queue", Duration::from_secs(3), refresh_fn(|| async { Ok(()) }));
/// assert_eq!(topic.name(), "queue");
/// ```
pub fn refresh_fn<F, Fut>(f: F) -> RefreshFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    RefreshFn(f)
}

#[async_trait]
impl<F, Fut> Refresh for RefreshFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn refresh(&self) -> Result<()> {
        (self.0)().await
    }
}

// ── Topics ──────────────────────────────────────────────────────────

/// A named piece of client state with its refresh callback, the push
/// message types that invalidate it, and its poll cadence.
#[derive(Clone)]
pub struct Topic {
    name: String,
    triggers: Vec<PushKind>,
    poll_interval: Duration,
    refresh: Arc<dyn Refresh>,
}

impl Topic {
    /// Create a topic with no push triggers.
    pub fn new(name: impl Into<String>, poll_interval: Duration, refresh: impl Refresh) -> Self {
        Self {
            name: name.into(),
            triggers: Vec::new(),
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            refresh: Arc::new(refresh),
        }
    }

    /// Queue topic: refreshed by `QUEUE_UPDATE` and `TIMED_QUEUE_UPDATE`,
    /// polled every 3 seconds.
    pub fn queue(refresh: impl Refresh) -> Self {
        Self::new(QUEUE_TOPIC, DEFAULT_QUEUE_POLL_INTERVAL, refresh)
            .triggered_by(PushKind::QueueUpdate)
            .triggered_by(PushKind::TimedQueueUpdate)
    }

    /// Roster topic: refreshed by `PLAYER_UPDATE`, polled every 5 seconds.
    pub fn roster(refresh: impl Refresh) -> Self {
        Self::new(ROSTER_TOPIC, DEFAULT_ROSTER_POLL_INTERVAL, refresh)
            .triggered_by(PushKind::PlayerUpdate)
    }

    /// Also refresh this topic when a push message of `kind` arrives.
    #[must_use]
    pub fn triggered_by(mut self, kind: PushKind) -> Self {
        if !self.triggers.contains(&kind) {
            self.triggers.push(kind);
        }
        self
    }

    /// Override the poll cadence.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Whether a push message of `kind` invalidates this topic.
    pub fn is_triggered_by(&self, kind: &PushKind) -> bool {
        self.triggers.contains(kind)
    }
}

impl std::fmt::Debug for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .field("triggers", &self.triggers)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`LiveSync`] channel.
///
/// # Example
///
/// ```
/// use simqueue_client::sync::{refresh_fn, SyncConfig, Topic};
/// use std::time::Duration;
///
/// let config = SyncConfig::new()
///     .with_topic(Topic::queue(refresh_fn(|| async { Ok(()) })))
///     .with_max_reconnect_attempts(5)
///     .with_reconnect_base_delay(Duration::from_millis(500));
/// assert_eq!(config.topics().len(), 1);
/// assert_eq!(config.max_reconnect_attempts, 5);
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    topics: Vec<Topic>,
    /// Reconnect attempts after the first failure before settling on polling.
    ///
    /// Defaults to **3**.
    pub max_reconnect_attempts: u32,
    /// Delay before the first reconnect; doubled for each further attempt.
    ///
    /// Defaults to **1 second**.
    pub reconnect_base_delay: Duration,
    /// Deadline for one connection attempt. Defaults to **5 seconds**.
    pub connect_timeout: Duration,
    /// Capacity of the bounded event channel. Defaults to **256**, clamped to ≥ 1.
    pub event_channel_capacity: usize,
    /// Time given to the loop to close the transport on
    /// [`LiveSync::shutdown`] before it is aborted. Defaults to **1 second**.
    pub shutdown_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncConfig {
    /// Default configuration with no topics.
    pub fn new() -> Self {
        Self {
            topics: Vec::new(),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_base_delay: DEFAULT_RECONNECT_BASE_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Register a topic. A later topic with the same name replaces the earlier one.
    #[must_use]
    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topics.retain(|existing| existing.name != topic.name);
        self.topics.push(topic);
        self
    }

    #[must_use]
    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_reconnect_base_delay(mut self, delay: Duration) -> Self {
        self.reconnect_base_delay = delay;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Registered topics.
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Backoff before reconnect attempt number `attempt` (0-based).
    pub fn reconnect_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.reconnect_base_delay.saturating_mul(factor)
    }
}

// ── Shared state ────────────────────────────────────────────────────

struct SyncShared {
    state: AtomicU8,
    foreground: AtomicBool,
    polling: AtomicBool,
}

impl SyncShared {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(SyncState::Connecting.to_u8()),
            foreground: AtomicBool::new(true),
            polling: AtomicBool::new(false),
        }
    }

    fn state(&self) -> SyncState {
        SyncState::from_u8(self.state.load(Ordering::Acquire))
    }
}

/// Settings the loop needs once topics are split off.
#[derive(Clone, Copy)]
struct LoopSettings {
    max_reconnect_attempts: u32,
    connect_timeout: Duration,
}

// ── Handle ──────────────────────────────────────────────────────────

/// Handle to a running live update channel.
///
/// Created via [`LiveSync::start`]. Dropping the handle aborts the
/// background loop and its poll timers; call [`shutdown`](Self::shutdown)
/// for a graceful close.
pub struct LiveSync {
    shared: Arc<SyncShared>,
    task: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    shutdown_timeout: Duration,
    reconnect_delays: Vec<Duration>,
}

impl LiveSync {
    /// Spawn the sync loop and return the handle plus the event receiver.
    ///
    /// The first connection attempt starts immediately.
    #[must_use = "the event receiver must be used to receive events"]
    pub fn start(
        connector: impl Connector,
        config: SyncConfig,
    ) -> (Self, mpsc::Receiver<SyncEvent>) {
        let capacity = config.event_channel_capacity.max(1);
        let (event_tx, event_rx) = mpsc::channel::<SyncEvent>(capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let reconnect_delays = (0..config.max_reconnect_attempts)
            .map(|attempt| config.reconnect_delay(attempt))
            .collect::<Vec<_>>();
        let settings = LoopSettings {
            max_reconnect_attempts: config.max_reconnect_attempts,
            connect_timeout: config.connect_timeout,
        };

        let shared = Arc::new(SyncShared::new());
        let task = tokio::spawn(sync_loop(
            connector,
            Arc::from(config.topics),
            settings,
            reconnect_delays.clone(),
            event_tx,
            Arc::clone(&shared),
            shutdown_rx,
        ));

        let sync = Self {
            shared,
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
            shutdown_timeout: config.shutdown_timeout,
            reconnect_delays,
        };
        (sync, event_rx)
    }

    /// Current channel state.
    pub fn state(&self) -> SyncState {
        self.shared.state()
    }

    /// `true` while poll timers are running.
    pub fn is_polling(&self) -> bool {
        self.shared.polling.load(Ordering::Acquire)
    }

    /// Report whether the owning view is visible. Poll ticks are skipped
    /// while it is not; push-triggered refreshes still run.
    pub fn set_foreground(&self, foreground: bool) {
        self.shared.foreground.store(foreground, Ordering::Release);
    }

    /// Whether the owning view is currently reported as visible.
    pub fn is_foreground(&self) -> bool {
        self.shared.foreground.load(Ordering::Acquire)
    }

    /// Backoff schedule this channel will use.
    pub fn reconnect_schedule(&self) -> &[Duration] {
        &self.reconnect_delays
    }

    /// Tear the channel down: close the transport, stop all timers and
    /// discard the reconnect schedule. Idempotent.
    pub async fn shutdown(&mut self) {
        debug!("LiveSync: shutdown requested");

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!("sync loop terminated with join error: {join_err}");
                }
                Err(_) => {
                    warn!("sync loop did not exit within timeout; aborting task");
                    task.abort();
                    if let Err(join_err) = task.await {
                        debug!("sync loop aborted: {join_err}");
                    }
                }
            }
        }

        self.shared.polling.store(false, Ordering::Release);
        self.shared
            .state
            .store(SyncState::Closed.to_u8(), Ordering::Release);
    }
}

impl std::fmt::Debug for LiveSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSync")
            .field("state", &self.state())
            .field("polling", &self.is_polling())
            .field("foreground", &self.is_foreground())
            .field("has_task", &self.task.is_some())
            .finish()
    }
}

impl Drop for LiveSync {
    fn drop(&mut self) {
        // No executor to drive a graceful close here; aborting drops the
        // loop future, whose join sets abort the timers and refreshes.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ── Sync loop ───────────────────────────────────────────────────────

/// How a connected session ended.
enum SessionEnd {
    Shutdown,
    Lost(String),
}

#[allow(clippy::too_many_arguments)]
async fn sync_loop(
    connector: impl Connector,
    topics: Arc<[Topic]>,
    settings: LoopSettings,
    reconnect_delays: Vec<Duration>,
    event_tx: mpsc::Sender<SyncEvent>,
    shared: Arc<SyncShared>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    debug!(topics = topics.len(), "sync loop started");
    emit_event(&event_tx, SyncEvent::StateChanged(SyncState::Connecting));

    let mut pollers = PollerSet::new(Arc::clone(&topics), event_tx.clone(), Arc::clone(&shared));
    // Push-triggered refreshes; owned here so teardown can cancel them.
    let mut refreshes = JoinSet::new();
    let mut attempt: u32 = 0;

    'outer: loop {
        let opened = tokio::select! {
            result = tokio::time::timeout(settings.connect_timeout, connector.connect()) => result,
            _ = &mut shutdown_rx => break 'outer,
        };

        match opened {
            Ok(Ok(mut transport)) => {
                attempt = 0;
                pollers.stop().await;
                set_state(&shared, &event_tx, SyncState::Connected);
                info!("push channel connected");

                let end = run_session(
                    &mut transport,
                    &topics,
                    &event_tx,
                    &mut refreshes,
                    &mut shutdown_rx,
                )
                .await;
                match end {
                    SessionEnd::Shutdown => {
                        if let Err(e) = transport.close().await {
                            debug!("push channel close failed: {e}");
                        }
                        break 'outer;
                    }
                    SessionEnd::Lost(reason) => {
                        warn!("push channel lost ({reason}), falling back to polling");
                    }
                }
            }
            Ok(Err(e)) => warn!("push channel failed to open ({e}), falling back to polling"),
            Err(_) => warn!("push channel connect timed out, falling back to polling"),
        }

        pollers.start();
        set_state(&shared, &event_tx, SyncState::DegradedPolling);

        let Some(delay) = reconnect_delays.get(attempt as usize).copied() else {
            info!(
                attempts = settings.max_reconnect_attempts,
                "reconnect ceiling reached, polling until shutdown"
            );
            let _ = (&mut shutdown_rx).await;
            break 'outer;
        };
        attempt += 1;
        debug!(
            attempt,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "scheduling push channel reconnect"
        );

        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            _ = &mut shutdown_rx => break 'outer,
        }
    }

    // Nothing may report after Closed: cancel timers and in-flight refreshes
    // and wait for them, which also drops their event senders.
    pollers.stop().await;
    drop(pollers);
    if !refreshes.is_empty() {
        debug!(in_flight = refreshes.len(), "cancelling in-flight refreshes");
    }
    refreshes.shutdown().await;
    set_state(&shared, &event_tx, SyncState::Closed);
    if event_tx.send(SyncEvent::Closed).await.is_err() {
        debug!("event channel closed, receiver dropped");
    }
    debug!("sync loop exited");
}

/// Pump one connected transport until it fails or shutdown is requested.
async fn run_session(
    transport: &mut Box<dyn Transport>,
    topics: &Arc<[Topic]>,
    event_tx: &mpsc::Sender<SyncEvent>,
    refreshes: &mut JoinSet<()>,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> SessionEnd {
    loop {
        tokio::select! {
            _ = &mut *shutdown_rx => return SessionEnd::Shutdown,
            Some(done) = refreshes.join_next(), if !refreshes.is_empty() => {
                if let Err(e) = done {
                    if e.is_panic() {
                        warn!("refresh task panicked: {e}");
                    }
                }
            }
            incoming = transport.recv() => match incoming {
                Some(Ok(text)) => dispatch(&text, topics, event_tx, refreshes),
                Some(Err(e)) => return SessionEnd::Lost(e.to_string()),
                None => return SessionEnd::Lost("closed by backend".into()),
            },
        }
    }
}

/// Route one push message to the topics it invalidates.
fn dispatch(
    text: &str,
    topics: &Arc<[Topic]>,
    event_tx: &mpsc::Sender<SyncEvent>,
    refreshes: &mut JoinSet<()>,
) {
    let message = match PushMessage::parse(text) {
        Ok(message) => message,
        Err(e) => {
            warn!("dropping malformed push message: {e}; raw: {text}");
            return;
        }
    };

    debug!(kind = %message.kind, "push message");
    let mut routed = false;
    for topic in topics.iter().filter(|topic| topic.is_triggered_by(&message.kind)) {
        let topic = topic.clone();
        let event_tx = event_tx.clone();
        refreshes.spawn(async move { run_refresh(&topic, &event_tx).await });
        routed = true;
    }
    if !routed {
        debug!(kind = %message.kind, "push message matches no topic");
    }
    emit_event(event_tx, SyncEvent::Message(message.kind));
}

fn set_state(shared: &SyncShared, event_tx: &mpsc::Sender<SyncEvent>, next: SyncState) {
    let previous = SyncState::from_u8(shared.state.swap(next.to_u8(), Ordering::AcqRel));
    if previous != next {
        debug!(?previous, ?next, "sync state");
        emit_event(event_tx, SyncEvent::StateChanged(next));
    }
}

/// Emit an event without blocking the loop; dropped with a warning if full.
fn emit_event(event_tx: &mpsc::Sender<SyncEvent>, event: SyncEvent) {
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            warn!("event channel full, dropping event: {dropped:?}");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("event channel closed, receiver dropped");
        }
    }
}

// ── Refresh execution ───────────────────────────────────────────────

/// Run a topic's refresh. Failures become [`SyncEvent::RefreshFailed`].
///
/// Push-triggered refreshes run on the loop's `JoinSet` so a slow backend
/// never stalls the channel; poll timers await it inline.
async fn run_refresh(topic: &Topic, event_tx: &mpsc::Sender<SyncEvent>) {
    if let Err(e) = topic.refresh.refresh().await {
        warn!(topic = %topic.name, "refresh failed: {e}");
        emit_event(
            event_tx,
            SyncEvent::RefreshFailed {
                topic: topic.name.clone(),
                message: e.to_string(),
            },
        );
    }
}

// ── Poll timers ─────────────────────────────────────────────────────

/// One poll timer per topic, running only while degraded.
struct PollerSet {
    topics: Arc<[Topic]>,
    event_tx: mpsc::Sender<SyncEvent>,
    shared: Arc<SyncShared>,
    timers: JoinSet<()>,
}

impl PollerSet {
    fn new(topics: Arc<[Topic]>, event_tx: mpsc::Sender<SyncEvent>, shared: Arc<SyncShared>) -> Self {
        Self {
            topics,
            event_tx,
            shared,
            timers: JoinSet::new(),
        }
    }

    /// Start the timers unless they are already running.
    fn start(&mut self) {
        if !self.timers.is_empty() {
            return;
        }
        for topic in self.topics.iter() {
            debug!(
                topic = %topic.name,
                interval_ms = u64::try_from(topic.poll_interval.as_millis()).unwrap_or(u64::MAX),
                "starting poll timer"
            );
            self.timers.spawn(poll_topic(
                topic.clone(),
                self.event_tx.clone(),
                Arc::clone(&self.shared),
            ));
        }
        self.shared.polling.store(true, Ordering::Release);
    }

    /// Abort the timers and wait until none of them is running.
    async fn stop(&mut self) {
        if !self.timers.is_empty() {
            debug!(timers = self.timers.len(), "stopping poll timers");
        }
        self.timers.shutdown().await;
        self.shared.polling.store(false, Ordering::Release);
    }
}

/// First tick fires one interval after start, then every interval.
async fn poll_topic(topic: Topic, event_tx: mpsc::Sender<SyncEvent>, shared: Arc<SyncShared>) {
    let period = topic.poll_interval;
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if !shared.foreground.load(Ordering::Acquire) {
            debug!(topic = %topic.name, "view in background, skipping poll");
            continue;
        }
        run_refresh(&topic, &event_tx).await;
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    fn noop() -> RefreshFn<impl Fn() -> std::future::Ready<Result<()>> + Send + Sync + 'static> {
        refresh_fn(|| std::future::ready(Ok(())))
    }

    #[test]
    fn config_defaults() {
        let config = SyncConfig::new();
        assert!(config.topics().is_empty());
        assert_eq!(config.max_reconnect_attempts, 3);
        assert_eq!(config.reconnect_base_delay, Duration::from_secs(1));
        assert_eq!(config.event_channel_capacity, 256);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(1));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let config = SyncConfig::new();
        let delays: Vec<Duration> = (0..3).map(|a| config.reconnect_delay(a)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        let config = SyncConfig::new();
        assert!(config.reconnect_delay(200) >= Duration::from_secs(u64::from(u32::MAX)));
    }

    #[test]
    fn event_channel_capacity_is_clamped_to_one() {
        let config = SyncConfig::new().with_event_channel_capacity(0);
        assert_eq!(config.event_channel_capacity, 1);
    }

    #[test]
    fn default_topics_route_expected_messages() {
        let queue = Topic::queue(noop());
        let roster = Topic::roster(noop());
        assert!(queue.is_triggered_by(&PushKind::QueueUpdate));
        assert!(queue.is_triggered_by(&PushKind::TimedQueueUpdate));
        assert!(!queue.is_triggered_by(&PushKind::PlayerUpdate));
        assert!(roster.is_triggered_by(&PushKind::PlayerUpdate));
        assert_eq!(queue.poll_interval(), DEFAULT_QUEUE_POLL_INTERVAL);
        assert_eq!(roster.poll_interval(), DEFAULT_ROSTER_POLL_INTERVAL);
    }

    #[test]
    fn same_named_topic_replaces_previous() {
        let config = SyncConfig::new()
            .with_topic(Topic::queue(noop()))
            .with_topic(Topic::queue(noop()).with_poll_interval(Duration::from_secs(9)));
        assert_eq!(config.topics().len(), 1);
        assert_eq!(config.topics()[0].poll_interval(), Duration::from_secs(9));
    }

    #[test]
    fn zero_poll_interval_is_clamped() {
        let topic = Topic::new("x", Duration::ZERO, noop());
        assert_eq!(topic.poll_interval(), MIN_POLL_INTERVAL);
    }
}
