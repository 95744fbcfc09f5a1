//! Logged-in user and API token.
//!
//! The session is an explicit object handed to the backend and the board at
//! composition time. Persistence goes through [`SessionStore`], so callers
//! can back it with anything from memory to a keychain.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::model::{PlayerId, Role};

/// The authenticated staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// Token plus user, as returned by the login call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

impl Session {
    /// Whether this session may drive simulator PCs (autopilot, kill).
    pub fn can_operate_simulators(&self) -> bool {
        self.user.role.can_operate_simulators()
    }
}

/// Narrow read/write interface over wherever the session lives.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Current session, if logged in.
    async fn load(&self) -> Option<Session>;

    /// Replace the stored session.
    async fn save(&self, session: Session);

    /// Log out.
    async fn clear(&self);
}

/// Process-local session storage.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start already logged in.
    pub fn with_session(session: Session) -> Self {
        Self {
            inner: RwLock::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Option<Session> {
        self.inner.read().await.clone()
    }

    async fn save(&self, session: Session) {
        *self.inner.write().await = Some(session);
    }

    async fn clear(&self) {
        *self.inner.write().await = None;
    }
}
