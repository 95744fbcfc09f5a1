//! [`Backend`] over the queue REST API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, info};

use super::{request_error, send};
use crate::backend::{require_id, Backend};
use crate::config::ClientConfig;
use crate::error::{QueueClientError, Result};
use crate::model::{EntryId, NormalizedStatus, Player, SimulatorId, SimulatorQueue};
use crate::protocol::{
    normalize_status, parse_player, parse_players, parse_simulators, unwrap_envelope,
    AddToQueueBody, CreatePlayerBody, LoginBody, MoveBody,
};
use crate::session::{Session, SessionStore};

/// REST client for the queue backend.
///
/// Every request carries `Authorization: Bearer <token>` while the session
/// store holds a session.
///
/// ```rust,no_run
/// # async fn example() -> simqueue_client::Result<()> {
/// use std::sync::Arc;
/// use simqueue_client::{Backend, ClientConfig, HttpBackend, MemorySessionStore};
///
/// let backend = HttpBackend::new(&ClientConfig::from_env()?, Arc::new(MemorySessionStore::new()))?;
/// backend.login("caixa@pista.local", "senha").await?;
/// let simulators = backend.fetch_simulators().await?;
/// # Ok(())
/// # }
/// ```
pub struct HttpBackend {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns [`QueueClientError::Request`] if the HTTP client cannot be built
    /// (TLS backend initialization).
    pub fn new(config: &ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| QueueClientError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authenticate and store the resulting session.
    ///
    /// # Errors
    ///
    /// Returns [`QueueClientError::Validation`] for blank credentials,
    /// [`QueueClientError::Http`] when the backend rejects them.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(QueueClientError::Validation(
                "email and password are required".into(),
            ));
        }
        let body = LoginBody {
            email: email.trim(),
            password,
        };
        let response = send(self.client.post(self.url("/auth/login")).json(&body)).await?;
        let value: Value = response.json().await.map_err(request_error)?;
        let session: Session = serde_json::from_value(unwrap_envelope(value))?;
        info!(user_id = session.user.id, role = session.user.role.as_str(), "logged in");
        self.session.save(session.clone()).await;
        Ok(session)
    }

    /// Drop the stored session.
    pub async fn logout(&self) {
        self.session.clear().await;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.load().await {
            Some(session) => request.bearer_auth(session.token),
            None => request,
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        debug!(path, "GET");
        let request = self.authorized(self.client.get(self.url(path))).await;
        send(request).await?.json().await.map_err(request_error)
    }

    async fn fire(&self, request: RequestBuilder) -> Result<()> {
        send(self.authorized(request).await).await.map(drop)
    }
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_simulators(&self) -> Result<Vec<SimulatorQueue>> {
        parse_simulators(self.get_json("/simulators").await?)
    }

    async fn fetch_status(&self, simulator: SimulatorId) -> Result<NormalizedStatus> {
        let simulator = require_id("simulator", simulator)?;
        let value = self
            .get_json(&format!("/timed-queue/{simulator}/status"))
            .await?;
        Ok(normalize_status(value))
    }

    async fn fetch_players(&self) -> Result<Vec<Player>> {
        parse_players(self.get_json("/players").await?)
    }

    async fn create_player(&self, body: &CreatePlayerBody) -> Result<Player> {
        debug!(seller_id = ?body.seller_id, "POST /players");
        let request = self
            .authorized(self.client.post(self.url("/players")).json(body))
            .await;
        let value: Value = send(request).await?.json().await.map_err(request_error)?;
        parse_player(value)
    }

    async fn add_to_queue(&self, body: &AddToQueueBody) -> Result<()> {
        require_id("player", body.player_id)?;
        require_id("simulator", body.simulator_id)?;
        debug!(simulator_id = body.simulator_id, player_id = body.player_id, "POST /queue");
        self.fire(self.client.post(self.url("/queue")).json(body)).await
    }

    async fn remove_from_queue(&self, entry: EntryId) -> Result<()> {
        let entry = require_id("entry", entry)?;
        self.fire(self.client.delete(self.url(&format!("/queue/{entry}"))))
            .await
    }

    async fn move_to_position(&self, entry: EntryId, position: i64) -> Result<()> {
        let entry = require_id("entry", entry)?;
        self.fire(
            self.client
                .put(self.url(&format!("/queue/{entry}/position")))
                .json(&MoveBody { position }),
        )
        .await
    }

    async fn confirm_turn(&self, entry: EntryId) -> Result<()> {
        let entry = require_id("entry", entry)?;
        self.fire(
            self.client
                .post(self.url(&format!("/timed-queue/{entry}/confirm"))),
        )
        .await
    }

    async fn advance(&self, simulator: SimulatorId) -> Result<()> {
        let simulator = require_id("simulator", simulator)?;
        self.fire(
            self.client
                .post(self.url(&format!("/timed-queue/{simulator}/next"))),
        )
        .await
    }

    async fn start_turns(&self, simulator: SimulatorId) -> Result<()> {
        let simulator = require_id("simulator", simulator)?;
        self.fire(
            self.client
                .post(self.url(&format!("/timed-queue/{simulator}/start"))),
        )
        .await
    }

    async fn mark_missed(&self, entry: EntryId) -> Result<()> {
        let entry = require_id("entry", entry)?;
        self.fire(
            self.client
                .post(self.url(&format!("/timed-queue/{entry}/missed"))),
        )
        .await
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
    use crate::http::test_server::respond_once;
    use crate::model::Role;
    use crate::session::{MemorySessionStore, SessionUser};

    fn backend(url: &str, store: Arc<MemorySessionStore>) -> HttpBackend {
        HttpBackend::new(&ClientConfig::new().with_api_base_url(url), store).unwrap()
    }

    fn logged_in() -> Arc<MemorySessionStore> {
        Arc::new(MemorySessionStore::with_session(Session {
            token: "tok-123".into(),
            user: SessionUser {
                id: 1,
                name: "Caixa".into(),
                email: "caixa@pista.local".into(),
                role: Role::Seller,
            },
        }))
    }

    #[tokio::test]
    async fn fetch_simulators_sends_bearer_and_parses_queue() {
        let (url, request) = respond_once(
            200,
            r#"[{"id":1,"name":"Sim 1","Queue":[{"id":10,"Player":{"id":100,"name":"Ana"}}]}]"#,
        )
        .await;
        let simulators = backend(&url, logged_in()).fetch_simulators().await.unwrap();
        assert_eq!(simulators.len(), 1);
        assert_eq!(simulators[0].entries[0].player.name, "Ana");

        let raw = request.await.unwrap().to_ascii_lowercase();
        assert!(raw.starts_with("get /simulators "));
        assert!(raw.contains("authorization: bearer tok-123"));
    }

    #[tokio::test]
    async fn status_envelope_is_normalized() {
        let (url, request) = respond_once(
            200,
            r#"{"data":[{"id":10,"player":{"id":100},"status":"CONFIRMED","timeLeft":30000}]}"#,
        )
        .await;
        let status = backend(&url, logged_in()).fetch_status(4).await.unwrap();
        assert_eq!(status.items().len(), 1);
        assert_eq!(status.items()[0].time_left_ms, Some(30_000));
        assert!(request
            .await
            .unwrap()
            .starts_with("GET /timed-queue/4/status "));
    }

    #[tokio::test]
    async fn non_success_maps_to_http_error() {
        let (url, _request) = respond_once(400, r#"{"message":"Posição inválida"}"#).await;
        let err = backend(&url, logged_in())
            .move_to_position(7, 2)
            .await
            .unwrap_err();
        match err {
            QueueClientError::Http { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Posição inválida");
            }
            other => panic!("expected Http, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn move_sends_absolute_position() {
        let (url, request) = respond_once(200, "{}").await;
        backend(&url, logged_in())
            .move_to_position(7, 5)
            .await
            .unwrap();
        let raw = request.await.unwrap();
        assert!(raw.starts_with("PUT /queue/7/position "));
        assert!(raw.ends_with(r#"{"position":5}"#));
    }

    #[tokio::test]
    async fn zero_ids_never_reach_the_network() {
        let backend = backend("http://127.0.0.1:1", logged_in());
        assert!(matches!(
            backend.confirm_turn(0).await,
            Err(QueueClientError::Validation(_))
        ));
        assert!(matches!(
            backend.advance(0).await,
            Err(QueueClientError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn refused_connection_is_request_error() {
        let err = backend("http://127.0.0.1:1", logged_in())
            .fetch_players()
            .await
            .unwrap_err();
        assert!(matches!(err, QueueClientError::Request(_)));
    }

    #[tokio::test]
    async fn create_player_posts_camel_case_body() {
        let (url, request) = respond_once(
            201,
            r#"{"id":55,"name":"Ana","email":"ana@x","role":"PLAYER","phone":null}"#,
        )
        .await;
        let body = CreatePlayerBody {
            name: "Ana".into(),
            email: "ana@x".into(),
            phone: Some("11 9999-0000".into()),
            seller_id: Some(1),
        };
        let player = backend(&url, logged_in())
            .create_player(&body)
            .await
            .unwrap();
        assert_eq!(player.id, 55);
        assert_eq!(player.name, "Ana");
        assert_eq!(player.phone, None);

        let raw = request.await.unwrap();
        assert!(raw.starts_with("POST /players "));
        assert!(raw
            .to_ascii_lowercase()
            .contains("authorization: bearer tok-123"));
        assert!(raw.ends_with(
            r#"{"name":"Ana","email":"ana@x","phone":"11 9999-0000","sellerId":1}"#
        ));
    }

    #[tokio::test]
    async fn rejected_registration_is_http_error() {
        let (url, _request) = respond_once(409, r#"{"message":"E-mail já cadastrado"}"#).await;
        let body = CreatePlayerBody {
            name: "Ana".into(),
            email: "ana@x".into(),
            phone: None,
            seller_id: None,
        };
        let err = backend(&url, logged_in())
            .create_player(&body)
            .await
            .unwrap_err();
        assert!(matches!(err, QueueClientError::Http { status: 409, .. }));
    }

    #[tokio::test]
    async fn login_stores_session_from_envelope() {
        let (url, _request) = respond_once(
            200,
            r#"{"data":{"token":"fresh","user":{"id":2,"name":"Lia","email":"lia@x","role":"ADMIN"}}}"#,
        )
        .await;
        let store = Arc::new(MemorySessionStore::new());
        let session = backend(&url, Arc::clone(&store))
            .login("lia@x", "pw")
            .await
            .unwrap();
        assert_eq!(session.user.role, Role::Admin);
        assert_eq!(store.load().await.unwrap().token, "fresh");
    }
}
