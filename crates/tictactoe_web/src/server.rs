//! HTTP routes for the browser game.
//!
//! - `GET /` serves the single-page UI.
//! - `GET /get_state` returns the session's game record.
//! - `POST /move` takes `{"row": r, "col": c}` and plays the current mark.
//! - `POST /reset` starts the session over.
//!
//! A browser without a valid session cookie gets one minted on its first
//! request, whichever route that is.

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::session::{MemoryStore, SessionId, SessionManager};
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tictactoe_core::GameRecord;
use tracing::{info, instrument, warn};

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    sessions: SessionManager,
    cookie_name: Arc<str>,
}

impl AppState {
    /// Creates handler state from a session manager and cookie name.
    pub fn new(sessions: SessionManager, cookie_name: impl Into<Arc<str>>) -> Self {
        Self {
            sessions,
            cookie_name: cookie_name.into(),
        }
    }

    /// Creates handler state with in-memory sessions, as configured.
    pub fn from_config(config: &ServerConfig) -> Self {
        let store = MemoryStore::with_limits(*config.max_sessions(), config.session_idle_timeout());
        Self::new(
            SessionManager::new(Arc::new(store)),
            config.cookie_name().as_str(),
        )
    }

    /// Returns the session manager.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}

/// Body of `POST /move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct MoveRequest {
    /// Row index, 0-2.
    pub row: usize,
    /// Column index, 0-2.
    pub col: usize,
}

/// Reply to `POST /move`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    /// Whether the move was played.
    pub success: bool,
    /// Game state after the attempt.
    pub state: GameRecord,
    /// Why the move was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply to `POST /reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResponse {
    /// Always true once the reset is stored.
    pub success: bool,
}

/// The caller's session, taken from its cookie or freshly minted.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    id: SessionId,
    minted: bool,
}

impl Session {
    /// Returns the session id.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Headers to attach to the response: a `Set-Cookie` for new sessions.
    fn cookie_headers(&self, cookie_name: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if self.minted {
            match HeaderValue::from_str(&self.id.to_cookie(cookie_name)) {
                Ok(value) => {
                    headers.insert(SET_COOKIE, value);
                }
                Err(e) => warn!(error = %e, "Could not encode session cookie"),
            }
        }
        headers
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match SessionId::from_cookies(&parts.headers, &state.cookie_name) {
            Some(id) => Ok(Self { id, minted: false }),
            None => {
                let id = SessionId::generate();
                info!(session = %id, "Starting new session");
                Ok(Self { id, minted: true })
            }
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/get_state", get(get_state))
        .route("/move", post(make_move))
        .route("/reset", post(reset_game))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Logs every request once its response is ready.
async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    info!(%method, %uri, status = %response.status(), "Request handled");
    response
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[instrument(skip_all, fields(session = %session.id()))]
async fn get_state(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    let game = state.sessions.current(session.id())?;
    Ok((
        session.cookie_headers(&state.cookie_name),
        Json(game.to_record()),
    ))
}

#[instrument(skip_all, fields(session = %session.id()))]
async fn make_move(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<MoveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (result, game) = state.sessions.with_game(session.id(), |game| {
        (game.try_move(req.row, req.col), game.clone())
    })?;

    match &result {
        Ok(outcome) => info!(row = req.row, col = req.col, %outcome, "Move played"),
        Err(e) => info!(row = req.row, col = req.col, error = %e, "Move rejected"),
    }

    let response = MoveResponse {
        success: result.is_ok(),
        state: game.to_record(),
        error: result.err().map(|e| e.to_string()),
    };
    Ok((session.cookie_headers(&state.cookie_name), Json(response)))
}

#[instrument(skip_all, fields(session = %session.id()))]
async fn reset_game(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    state.sessions.reset(session.id())?;
    Ok((
        session.cookie_headers(&state.cookie_name),
        Json(ResetResponse { success: true }),
    ))
}
