//! Client-held queue state for the front desk.
//!
//! [`QueueBoard`] owns the cached simulator queues, the turn engine
//! snapshots and the player roster, and derives a [`DerivedView`] per
//! simulator on demand. It is the thing LiveSync refreshes: hand
//! [`QueueBoard::queue_refresher`] and [`QueueBoard::roster_refresher`] to
//! [`Topic::queue`](crate::sync::Topic::queue) and
//! [`Topic::roster`](crate::sync::Topic::roster).
//!
//! Refreshes are sequenced: each one takes a number when it starts, and a
//! response is only applied if nothing newer has been applied yet. Actions
//! call the backend and then refresh; response bodies are never applied.
//! Errors are returned to the caller and also kept as a single dismissable
//! [`Notice`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use futures_util::future::join_all;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::countdown::{self, COUNTDOWN_STEP};
use crate::error::{QueueClientError, Result};
use crate::launcher::Launcher;
use crate::model::{
    ActiveItem, EntryId, Player, PlayerId, QueueEntry, SimulatorId, SimulatorQueue,
    PLACEHOLDER_PLAYER_NAME,
};
use crate::protocol::{AddToQueueBody, CreatePlayerBody};
use crate::session::SessionStore;
use crate::sync::Refresh;
use crate::view_model::{derive, DerivedView, MoveDirection};

// ── Notices ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// A queue action or refresh failed.
    Error,
    /// A best-effort side call (launcher) failed; the main action went ahead.
    Warning,
}

/// The one message the front desk shows until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

// ── Inputs and outputs ──────────────────────────────────────────────

/// A request to put a player in a simulator's queue.
///
/// Free turns (`price == 0`) must carry a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddToQueue {
    pub simulator_id: SimulatorId,
    pub player_id: PlayerId,
    pub time_minutes: u32,
    pub price: u32,
    pub reason: Option<String>,
}

impl AddToQueue {
    pub fn new(simulator_id: SimulatorId, player_id: PlayerId, time_minutes: u32) -> Self {
        Self {
            simulator_id,
            player_id,
            time_minutes,
            price: 0,
            reason: None,
        }
    }

    #[must_use]
    pub fn with_price(mut self, price: u32) -> Self {
        self.price = price;
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Check the form before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns [`QueueClientError::Validation`] when no player or no
    /// simulator is selected, no time is chosen, or a free turn has no
    /// reason.
    pub fn validate(&self) -> Result<AddToQueueBody> {
        if self.player_id == 0 {
            return Err(QueueClientError::Validation("Selecione um jogador".into()));
        }
        if self.simulator_id == 0 {
            return Err(QueueClientError::Validation("Selecione um simulador".into()));
        }
        if self.time_minutes == 0 {
            return Err(QueueClientError::Validation("Selecione o tempo".into()));
        }
        let reason = self
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string);
        if self.price == 0 && reason.is_none() {
            return Err(QueueClientError::Validation(
                "Por favor, preencha o motivo quando selecionar 'Sem valor'".into(),
            ));
        }
        Ok(AddToQueueBody {
            player_id: self.player_id,
            simulator_id: self.simulator_id,
            time_minutes: self.time_minutes,
            price: self.price,
            reason,
        })
    }
}

/// A walk-in player to register at the front desk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl NewPlayer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
        }
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Trim the form and check the required fields.
    ///
    /// # Errors
    ///
    /// Returns [`QueueClientError::Validation`] when the name or the email
    /// is blank.
    pub fn validate(&self, seller_id: Option<PlayerId>) -> Result<CreatePlayerBody> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(QueueClientError::Validation("Preencha o nome".into()));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(QueueClientError::Validation("Preencha o e-mail".into()));
        }
        let phone = self
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
            .map(str::to_string);
        Ok(CreatePlayerBody {
            name: name.to_string(),
            email: email.to_string(),
            phone,
            seller_id: seller_id.filter(|id| *id != 0),
        })
    }
}

/// One simulator with its derived presentation model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorView {
    pub simulator: SimulatorQueue,
    pub view: DerivedView,
}

// ── Board ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct BoardState {
    simulators: Vec<SimulatorQueue>,
    statuses: HashMap<SimulatorId, Vec<ActiveItem>>,
    players: Vec<Player>,
    notice: Option<Notice>,
    applied_queue_seq: u64,
    applied_roster_seq: u64,
}

impl BoardState {
    fn simulator(&self, id: SimulatorId) -> Option<&SimulatorQueue> {
        self.simulators.iter().find(|simulator| simulator.id == id)
    }

    fn derive_view(&self, simulator: &SimulatorQueue) -> DerivedView {
        let active = self
            .statuses
            .get(&simulator.id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        derive(&simulator.entries, active)
    }

    fn find_entry(&self, entry_id: EntryId) -> Option<(&SimulatorQueue, &QueueEntry)> {
        self.simulators.iter().find_map(|simulator| {
            simulator
                .entries
                .iter()
                .find(|entry| entry.id == entry_id)
                .map(|entry| (simulator, entry))
        })
    }
}

/// Cached queues, snapshots and roster, plus the actions a front desk
/// performs on them.
pub struct QueueBoard {
    backend: Arc<dyn Backend>,
    launcher: Option<Arc<dyn Launcher>>,
    session: Arc<dyn SessionStore>,
    state: Mutex<BoardState>,
    closed: AtomicBool,
    queue_seq: AtomicU64,
    roster_seq: AtomicU64,
    next_placeholder_id: AtomicU64,
}

impl QueueBoard {
    pub fn new(backend: Arc<dyn Backend>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            backend,
            launcher: None,
            session,
            state: Mutex::new(BoardState::default()),
            closed: AtomicBool::new(false),
            queue_seq: AtomicU64::new(0),
            roster_seq: AtomicU64::new(0),
            next_placeholder_id: AtomicU64::new(u64::MAX),
        }
    }

    /// Enable simulator PC control (session kill on advance, autopilot).
    #[must_use]
    pub fn with_launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    // ── Refresh ─────────────────────────────────────────────────────

    /// Re-fetch all simulators and their turn engine status.
    ///
    /// Status calls run concurrently; a simulator whose status call fails is
    /// shown as inactive while the others keep their results. Returns
    /// `Ok(false)` when the response was discarded because a newer refresh
    /// was already applied or the board was closed.
    ///
    /// # Errors
    ///
    /// Returns the simulator list fetch error (also kept as a notice), or
    /// [`QueueClientError::Closed`] if the board was closed.
    pub async fn refresh_queues(&self) -> Result<bool> {
        self.ensure_open()?;
        let seq = self.queue_seq.fetch_add(1, Ordering::AcqRel) + 1;

        let simulators = match self.backend.fetch_simulators().await {
            Ok(simulators) => simulators,
            Err(e) => {
                warn!(seq, "queue refresh failed: {e}");
                self.set_notice(Notice::error(format!("Erro ao carregar filas: {e}")))
                    .await;
                return Err(e);
            }
        };

        let statuses = join_all(simulators.iter().map(|simulator| async move {
            (simulator.id, self.backend.fetch_status(simulator.id).await)
        }))
        .await
        .into_iter()
        .map(|(simulator_id, status)| match status {
            Ok(status) => (simulator_id, status.into_items()),
            Err(e) => {
                warn!(simulator_id, "status fetch failed, showing simulator as idle: {e}");
                (simulator_id, Vec::new())
            }
        })
        .collect::<HashMap<_, _>>();

        let mut state = self.state.lock().await;
        if self.is_closed() {
            debug!(seq, "board closed, dropping queue refresh");
            return Ok(false);
        }
        if seq <= state.applied_queue_seq {
            debug!(
                seq,
                applied = state.applied_queue_seq,
                "discarding stale queue refresh"
            );
            return Ok(false);
        }
        state.applied_queue_seq = seq;
        state.simulators = simulators;
        state.statuses = statuses;
        Ok(true)
    }

    /// Re-fetch the player roster. Same sequencing as
    /// [`refresh_queues`](Self::refresh_queues).
    ///
    /// # Errors
    ///
    /// Returns the fetch error (also kept as a notice), or
    /// [`QueueClientError::Closed`].
    pub async fn refresh_roster(&self) -> Result<bool> {
        self.ensure_open()?;
        let seq = self.roster_seq.fetch_add(1, Ordering::AcqRel) + 1;

        let players = match self.backend.fetch_players().await {
            Ok(players) => players,
            Err(e) => {
                warn!(seq, "roster refresh failed: {e}");
                self.set_notice(Notice::error(format!("Erro ao carregar jogadores: {e}")))
                    .await;
                return Err(e);
            }
        };

        let mut state = self.state.lock().await;
        if self.is_closed() || seq <= state.applied_roster_seq {
            debug!(seq, "discarding stale roster refresh");
            return Ok(false);
        }
        state.applied_roster_seq = seq;
        state.players = players;
        Ok(true)
    }

    /// [`Refresh`] adapter for the queue topic.
    ///
    /// Holds a weak reference; once the board is dropped or closed the
    /// refresher does nothing.
    pub fn queue_refresher(self: &Arc<Self>) -> BoardRefresher {
        BoardRefresher {
            board: Arc::downgrade(self),
            target: RefreshTarget::Queues,
        }
    }

    /// [`Refresh`] adapter for the roster topic.
    pub fn roster_refresher(self: &Arc<Self>) -> BoardRefresher {
        BoardRefresher {
            board: Arc::downgrade(self),
            target: RefreshTarget::Roster,
        }
    }

    // ── Views ───────────────────────────────────────────────────────

    /// Derived view of every simulator, in backend order.
    pub async fn views(&self) -> Vec<SimulatorView> {
        let state = self.state.lock().await;
        state
            .simulators
            .iter()
            .map(|simulator| SimulatorView {
                view: state.derive_view(simulator),
                simulator: simulator.clone(),
            })
            .collect()
    }

    pub async fn view(&self, simulator_id: SimulatorId) -> Option<SimulatorView> {
        let state = self.state.lock().await;
        state.simulator(simulator_id).map(|simulator| SimulatorView {
            view: state.derive_view(simulator),
            simulator: simulator.clone(),
        })
    }

    pub async fn simulators(&self) -> Vec<SimulatorQueue> {
        self.state.lock().await.simulators.clone()
    }

    pub async fn players(&self) -> Vec<Player> {
        self.state.lock().await.players.clone()
    }

    /// Current snapshots for one simulator, including local countdown progress.
    pub async fn active_items(&self, simulator_id: SimulatorId) -> Vec<ActiveItem> {
        self.state
            .lock()
            .await
            .statuses
            .get(&simulator_id)
            .cloned()
            .unwrap_or_default()
    }

    // ── Actions ─────────────────────────────────────────────────────

    /// Validate, show a placeholder entry right away, enqueue, refresh.
    ///
    /// # Errors
    ///
    /// Validation errors are returned before any network call and leave the
    /// board untouched. Backend errors remove the placeholder and set a notice.
    pub async fn add_to_queue(&self, request: AddToQueue) -> Result<()> {
        self.ensure_open()?;
        let body = request.validate()?;
        let placeholder_id = self.insert_placeholder(&body).await;

        let result = self.backend.add_to_queue(&body).await;
        if result.is_err() {
            if let Some(id) = placeholder_id {
                self.remove_local(id).await;
            }
        }
        self.after_action("adicionar jogador à fila", result).await
    }

    /// Whether a player with this email is already registered.
    ///
    /// Compares trimmed, case-insensitively against a fresh roster fetch. A
    /// blank email is never in use.
    ///
    /// # Errors
    ///
    /// Returns the roster fetch error.
    pub async fn email_in_use(&self, email: &str) -> Result<bool> {
        self.ensure_open()?;
        let email = email.trim();
        if email.is_empty() {
            return Ok(false);
        }
        let players = self.backend.fetch_players().await?;
        Ok(players
            .iter()
            .any(|player| player.email.trim().eq_ignore_ascii_case(email)))
    }

    /// Validate, check the email is free, register, refresh the roster.
    ///
    /// The logged-in staff member is sent as the player's seller. Returns
    /// the created player so the caller can select it for a queue add. If
    /// the email check itself fails the registration goes ahead and the
    /// backend has the last word.
    ///
    /// # Errors
    ///
    /// Validation errors (blank name or email, email already in use) are
    /// returned before the player is created. Backend errors are returned
    /// and kept as a notice.
    pub async fn register_player(&self, player: NewPlayer) -> Result<Player> {
        self.ensure_open()?;
        let seller_id = self.session.load().await.map(|session| session.user.id);
        let body = player.validate(seller_id)?;

        match self.email_in_use(&body.email).await {
            Ok(true) => {
                return Err(QueueClientError::Validation(
                    "Este e-mail já está em uso".into(),
                ));
            }
            Ok(false) => {}
            Err(e) => warn!("email check failed, registering anyway: {e}"),
        }

        let created = match self.backend.create_player(&body).await {
            Ok(created) => created,
            Err(e) => {
                warn!("player registration failed: {e}");
                self.set_notice(Notice::error(format!("Erro ao cadastrar jogador: {e}")))
                    .await;
                return Err(e);
            }
        };
        info!(player_id = created.id, "player registered");
        if let Err(e) = self.refresh_roster().await {
            debug!("roster refresh after registration failed: {e}");
        }
        Ok(created)
    }

    /// Hide the entry right away, remove it in the backend, refresh.
    ///
    /// # Errors
    ///
    /// Placeholder entries cannot be removed yet ([`QueueClientError::Validation`]).
    /// On backend failure the board is refreshed to bring the entry back.
    pub async fn remove_from_queue(&self, entry_id: EntryId) -> Result<()> {
        self.ensure_open()?;
        self.ensure_confirmed_entry(entry_id).await?;
        self.remove_local(entry_id).await;

        let result = self.backend.remove_from_queue(entry_id).await;
        if result.is_err() {
            if let Err(e) = self.refresh_queues().await {
                debug!("refresh after failed removal also failed: {e}");
            }
        }
        self.after_action("remover jogador da fila", result).await
    }

    /// Move a waiting entry one step.
    ///
    /// Returns `Ok(false)` without calling the backend when the move is not
    /// allowed (first entry up, last entry down, the playing entry, a
    /// placeholder, or an unknown entry). Otherwise sends the absolute
    /// position of the nearest non-placeholder neighbour.
    ///
    /// # Errors
    ///
    /// Backend errors are returned and kept as a notice.
    pub async fn move_entry(
        &self,
        simulator_id: SimulatorId,
        entry_id: EntryId,
        direction: MoveDirection,
    ) -> Result<bool> {
        self.ensure_open()?;
        let target = {
            let state = self.state.lock().await;
            let Some(simulator) = state.simulator(simulator_id) else {
                debug!(simulator_id, "move on unknown simulator ignored");
                return Ok(false);
            };
            state.derive_view(simulator).move_target(entry_id, direction)
        };

        let Some(position) = target else {
            debug!(simulator_id, entry_id, ?direction, "move not allowed");
            return Ok(false);
        };
        debug!(simulator_id, entry_id, position, "moving entry");
        let result = self.backend.move_to_position(entry_id, position).await;
        self.after_action("mover jogador", result).await?;
        Ok(true)
    }

    /// Confirm that the called player arrived.
    ///
    /// # Errors
    ///
    /// Backend errors are returned and kept as a notice.
    pub async fn confirm_turn(&self, entry_id: EntryId) -> Result<()> {
        self.ensure_open()?;
        let result = self.backend.confirm_turn(entry_id).await;
        self.after_action("confirmar turno", result).await
    }

    /// Report a called player as a no-show.
    ///
    /// # Errors
    ///
    /// Backend errors are returned and kept as a notice.
    pub async fn mark_missed(&self, entry_id: EntryId) -> Result<()> {
        self.ensure_open()?;
        let result = self.backend.mark_missed(entry_id).await;
        self.after_action("processar turno perdido", result).await
    }

    /// Start the turn engine on an idle simulator.
    ///
    /// # Errors
    ///
    /// Backend errors are returned and kept as a notice.
    pub async fn start_turns(&self, simulator_id: SimulatorId) -> Result<()> {
        self.ensure_open()?;
        let result = self.backend.start_turns(simulator_id).await;
        self.after_action("iniciar fila temporizada", result).await
    }

    /// End the current turn and call the next player.
    ///
    /// When a launcher is configured and the simulator has a PC address, the
    /// running session is killed first. That call is best-effort: its
    /// failure is logged and noticed, and the advance goes ahead.
    ///
    /// # Errors
    ///
    /// Only the backend's advance error is returned.
    pub async fn advance_to_next(&self, simulator_id: SimulatorId) -> Result<()> {
        self.ensure_open()?;
        if let (Some(launcher), Some(ip)) = (&self.launcher, self.pc_address(simulator_id).await) {
            if let Err(e) = launcher.kill_session(&ip).await {
                warn!(simulator_id, ip = %ip, "session kill failed, advancing anyway: {e}");
                self.set_notice(Notice::warning(format!(
                    "Não foi possível encerrar a sessão no simulador: {e}"
                )))
                .await;
            }
        }
        let result = self.backend.advance(simulator_id).await;
        self.after_action("processar próximo jogador", result).await
    }

    /// Put the simulator PC into autopilot.
    ///
    /// # Errors
    ///
    /// [`QueueClientError::Validation`] when nobody with seller rights is
    /// logged in, no launcher is configured, or the simulator has no PC
    /// address; [`QueueClientError::Launcher`] when the PC call fails.
    pub async fn start_autopilot(&self, simulator_id: SimulatorId) -> Result<()> {
        let ip = self.autopilot_target(simulator_id).await?;
        match self.launcher_call(simulator_id, &ip, true).await {
            Ok(()) => {
                info!(simulator_id, "autopilot started");
                Ok(())
            }
            Err(e) => {
                self.set_notice(Notice::error("Erro ao iniciar AutoPlay")).await;
                Err(e)
            }
        }
    }

    /// Take the simulator PC out of autopilot.
    ///
    /// # Errors
    ///
    /// Same as [`start_autopilot`](Self::start_autopilot).
    pub async fn stop_autopilot(&self, simulator_id: SimulatorId) -> Result<()> {
        let ip = self.autopilot_target(simulator_id).await?;
        match self.launcher_call(simulator_id, &ip, false).await {
            Ok(()) => {
                info!(simulator_id, "autopilot stopped");
                Ok(())
            }
            Err(e) => {
                self.set_notice(Notice::error("Erro ao parar AutoPlay")).await;
                Err(e)
            }
        }
    }

    // ── Countdown ───────────────────────────────────────────────────

    /// Advance every live countdown by one step. Returns `true` if anything
    /// changed. The next refresh overwrites the result.
    pub async fn tick_countdown(&self) -> bool {
        if self.is_closed() {
            return false;
        }
        let mut state = self.state.lock().await;
        state
            .statuses
            .values_mut()
            .fold(false, |changed, items| {
                countdown::tick(items, COUNTDOWN_STEP) || changed
            })
    }

    /// Drive [`tick_countdown`](Self::tick_countdown) once per second until
    /// the board is closed or dropped.
    pub fn spawn_countdown(self: &Arc<Self>) -> JoinHandle<()> {
        let board = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval_at(Instant::now() + COUNTDOWN_STEP, COUNTDOWN_STEP);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(live) = board.upgrade() else { break };
                if live.is_closed() {
                    break;
                }
                live.tick_countdown().await;
            }
            debug!("countdown ticker stopped");
        })
    }

    // ── Notice & lifecycle ──────────────────────────────────────────

    pub async fn notice(&self) -> Option<Notice> {
        self.state.lock().await.notice.clone()
    }

    pub async fn dismiss_notice(&self) {
        self.state.lock().await.notice = None;
    }

    /// Stop applying responses. In-flight requests finish but are discarded.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("queue board closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // ── Internals ───────────────────────────────────────────────────

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(QueueClientError::Closed);
        }
        Ok(())
    }

    async fn set_notice(&self, notice: Notice) {
        if self.is_closed() {
            return;
        }
        self.state.lock().await.notice = Some(notice);
    }

    /// Refresh after a successful action; notice and return a failed one.
    async fn after_action(&self, action: &str, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                if let Err(e) = self.refresh_queues().await {
                    debug!(action, "follow-up refresh failed: {e}");
                }
                Ok(())
            }
            Err(e) => {
                warn!(action, "action failed: {e}");
                self.set_notice(Notice::error(format!("Erro ao {action}: {e}")))
                    .await;
                Err(e)
            }
        }
    }

    async fn insert_placeholder(&self, body: &AddToQueueBody) -> Option<EntryId> {
        let mut state = self.state.lock().await;
        let player = state
            .players
            .iter()
            .find(|player| player.id == body.player_id)
            .cloned()
            .unwrap_or_else(|| Player {
                id: body.player_id,
                name: PLACEHOLDER_PLAYER_NAME.to_string(),
                ..Player::default()
            });
        let simulator = state
            .simulators
            .iter_mut()
            .find(|simulator| simulator.id == body.simulator_id)?;
        let id = self.next_placeholder_id.fetch_sub(1, Ordering::AcqRel);
        simulator.entries.push(QueueEntry {
            id,
            player,
            position: None,
            placeholder: true,
        });
        Some(id)
    }

    async fn remove_local(&self, entry_id: EntryId) {
        let mut state = self.state.lock().await;
        for simulator in &mut state.simulators {
            simulator.entries.retain(|entry| entry.id != entry_id);
        }
    }

    async fn ensure_confirmed_entry(&self, entry_id: EntryId) -> Result<()> {
        let state = self.state.lock().await;
        match state.find_entry(entry_id) {
            Some((_, entry)) if entry.placeholder => Err(QueueClientError::Validation(
                "entry is still being added".into(),
            )),
            _ => Ok(()),
        }
    }

    async fn pc_address(&self, simulator_id: SimulatorId) -> Option<String> {
        let state = self.state.lock().await;
        state
            .simulator(simulator_id)
            .and_then(|simulator| simulator.pc_ip.clone())
    }

    async fn autopilot_target(&self, simulator_id: SimulatorId) -> Result<String> {
        self.ensure_open()?;
        let allowed = self
            .session
            .load()
            .await
            .is_some_and(|session| session.can_operate_simulators());
        if !allowed {
            return Err(QueueClientError::Validation(
                "autopilot requires a seller, admin or master session".into(),
            ));
        }
        if self.launcher.is_none() {
            return Err(QueueClientError::Validation(
                "no launcher configured".into(),
            ));
        }
        self.pc_address(simulator_id).await.ok_or_else(|| {
            QueueClientError::Validation(format!(
                "simulator {simulator_id} has no PC address configured"
            ))
        })
    }

    async fn launcher_call(&self, simulator_id: SimulatorId, ip: &str, start: bool) -> Result<()> {
        let Some(launcher) = &self.launcher else {
            return Err(QueueClientError::Validation("no launcher configured".into()));
        };
        let result = if start {
            launcher.start_autopilot(ip).await
        } else {
            launcher.stop_autopilot(ip).await
        };
        if let Err(e) = &result {
            warn!(simulator_id, ip, "autopilot call failed: {e}");
        }
        result
    }
}

impl std::fmt::Debug for QueueBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueBoard")
            .field("closed", &self.is_closed())
            .field("has_launcher", &self.launcher.is_some())
            .finish_non_exhaustive()
    }
}

// ── LiveSync adapters ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshTarget {
    Queues,
    Roster,
}

/// Plugs a [`QueueBoard`] into a LiveSync topic.
#[derive(Debug, Clone)]
pub struct BoardRefresher {
    board: Weak<QueueBoard>,
    target: RefreshTarget,
}

#[async_trait]
impl Refresh for BoardRefresher {
    async fn refresh(&self) -> Result<()> {
        let Some(board) = self.board.upgrade() else {
            return Ok(());
        };
        if board.is_closed() {
            return Ok(());
        }
        match self.target {
            RefreshTarget::Queues => board.refresh_queues().await.map(drop),
            RefreshTarget::Roster => board.refresh_roster().await.map(drop),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn paid_turn_needs_no_reason() {
        let body = AddToQueue::new(1, 100, 10).with_price(50).validate().unwrap();
        assert_eq!(body.reason, None);
        assert_eq!(body.time_minutes, 10);
    }

    #[test]
    fn free_turn_requires_non_blank_reason() {
        let err = AddToQueue::new(1, 100, 10)
            .with_reason("   ")
            .validate()
            .unwrap_err();
        assert!(matches!(err, QueueClientError::Validation(_)));

        let body = AddToQueue::new(1, 100, 10)
            .with_reason(" cortesia ")
            .validate()
            .unwrap();
        assert_eq!(body.reason.as_deref(), Some("cortesia"));
    }

    #[test]
    fn missing_player_or_time_is_rejected() {
        assert!(AddToQueue::new(1, 0, 10).with_price(5).validate().is_err());
        assert!(AddToQueue::new(1, 100, 0).with_price(5).validate().is_err());
        assert!(AddToQueue::new(0, 100, 10).with_price(5).validate().is_err());
    }

    #[test]
    fn notice_constructors_set_level() {
        assert_eq!(Notice::error("x").level, NoticeLevel::Error);
        assert_eq!(Notice::warning("y").level, NoticeLevel::Warning);
    }
}
