//! HTTP API v1 — session-scoped chat endpoints used by the dashboard.
//!
//! Endpoints:
//!
//! - `GET    /v1/personas`                 — Persona catalog
//! - `GET    /v1/models`                   — Selectable models
//! - `POST   /v1/sessions`                 — Create a session
//! - `GET    /v1/sessions/{id}`            — History, settings, stats
//! - `DELETE /v1/sessions/{id}`            — Drop a session
//! - `PATCH  /v1/sessions/{id}/settings`   — Change persona / memory / model
//! - `POST   /v1/sessions/{id}/messages`   — Send a message, get the new turn
//! - `POST   /v1/sessions/{id}/new-topic`  — Clear the memory window
//! - `DELETE /v1/sessions/{id}/history`    — Clear history, memory and timer

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use palaver_chat::{
    Orchestrator, SessionRegistry, SessionSettings, SessionSnapshot, SessionStats, SharedSession,
};
use palaver_core::{ChatModel, Error, ModelErrorKind, Persona, ProviderError, Turn};

// ── State ─────────────────────────────────────────────────────────────────

/// Shared state for the v1 API.
pub struct ApiV1State {
    pub orchestrator: Orchestrator,
    pub sessions: SessionRegistry,
    /// Settings applied to new sessions when the request leaves them out.
    pub defaults: SessionSettings,
}

pub type SharedApiState = Arc<ApiV1State>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/personas", get(list_personas_handler))
        .route("/models", get(list_models_handler))
        .route("/sessions", post(create_session_handler))
        .route(
            "/sessions/{id}",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route("/sessions/{id}/settings", patch(update_settings_handler))
        .route("/sessions/{id}/messages", post(send_message_handler))
        .route("/sessions/{id}/new-topic", post(new_topic_handler))
        .route(
            "/sessions/{id}/history",
            axum::routing::delete(clear_history_handler),
        )
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

/// Partial settings; absent fields keep their current (or default) value.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsPatch {
    #[serde(default)]
    persona: Option<Persona>,
    #[serde(default)]
    memory_turns: Option<usize>,
    #[serde(default)]
    model: Option<ChatModel>,
}

impl SettingsPatch {
    fn apply(self, base: SessionSettings) -> SessionSettings {
        SessionSettings {
            persona: self.persona.unwrap_or(base.persona),
            memory_turns: self.memory_turns.unwrap_or(base.memory_turns),
            model: self.model.unwrap_or(base.model),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SendMessageRequest {
    message: String,
}

#[derive(Debug, Serialize)]
struct SendMessageResponse {
    turn: Turn,
    stats: SessionStats,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersonaDto {
    name: Persona,
    description: String,
    assistant_label: String,
    default: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ModelDto {
    id: ChatModel,
    name: String,
    default: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<ModelErrorKind>,
}

/// Error returned by every handler in this module.
struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn not_found(id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorResponse {
                error: format!("Session '{id}' not found"),
                kind: None,
            },
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let (status, kind) = match &e {
            Error::Provider(ProviderError::RateLimited { .. }) => {
                (StatusCode::TOO_MANY_REQUESTS, Some(ModelErrorKind::RateLimit))
            }
            Error::Provider(p) => (StatusCode::BAD_GATEWAY, Some(p.kind())),
            Error::Config { .. } => (StatusCode::UNPROCESSABLE_ENTITY, None),
            Error::EmptyInput => (StatusCode::BAD_REQUEST, None),
        };
        Self {
            status,
            body: ErrorResponse {
                error: e.user_message(),
                kind,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

async fn lookup(state: &ApiV1State, id: &str) -> ApiResult<SharedSession> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| ApiError::not_found(id))
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn list_personas_handler(State(state): State<SharedApiState>) -> Json<Vec<PersonaDto>> {
    Json(
        Persona::ALL
            .into_iter()
            .map(|p| PersonaDto {
                name: p,
                description: p.description().into(),
                assistant_label: p.assistant_label().into(),
                default: p == state.defaults.persona,
            })
            .collect(),
    )
}

async fn list_models_handler(State(state): State<SharedApiState>) -> Json<Vec<ModelDto>> {
    Json(
        ChatModel::ALL
            .into_iter()
            .map(|m| ModelDto {
                id: m,
                name: m.display_name().into(),
                default: m == state.defaults.model,
            })
            .collect(),
    )
}

async fn create_session_handler(
    State(state): State<SharedApiState>,
    payload: Option<Json<SettingsPatch>>,
) -> ApiResult<(StatusCode, Json<SessionSnapshot>)> {
    // No body (or no JSON content type) means "use the defaults".
    let patch = payload.map(|Json(p)| p).unwrap_or_default();
    let settings = patch.apply(state.defaults);
    let (_, session) = state.sessions.create(settings).await?;
    let snapshot = session.lock().await.snapshot(Utc::now());
    Ok((StatusCode::CREATED, Json(snapshot)))
}

async fn get_session_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = lookup(&state, &id).await?;
    let snapshot = session.lock().await.snapshot(Utc::now());
    Ok(Json(snapshot))
}

async fn delete_session_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.sessions.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(&id))
    }
}

async fn update_settings_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
    Json(payload): Json<SettingsPatch>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = lookup(&state, &id).await?;
    let mut session = session.lock().await;
    let settings = payload.apply(session.settings());
    session.update_settings(settings)?;
    info!(
        session = %id,
        persona = %settings.persona,
        memory_turns = settings.memory_turns,
        model = %settings.model,
        "Settings updated"
    );
    Ok(Json(session.snapshot(Utc::now())))
}

async fn send_message_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> ApiResult<Json<SendMessageResponse>> {
    let session = lookup(&state, &id).await?;
    // Held for the whole model call: one in-flight send per session.
    let mut session = session.lock().await;

    info!(session = %id, message_len = payload.message.len(), "v1 message received");

    match state.orchestrator.respond(&mut session, &payload.message).await {
        Ok(turn) => Ok(Json(SendMessageResponse {
            turn,
            stats: session.stats(Utc::now()),
        })),
        Err(e) => {
            error!(session = %id, error = %e, "Send failed");
            Err(e.into())
        }
    }
}

async fn new_topic_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = lookup(&state, &id).await?;
    let mut session = session.lock().await;
    session.new_topic();
    info!(session = %id, "Memory cleared for new topic");
    Ok(Json(session.snapshot(Utc::now())))
}

async fn clear_history_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = lookup(&state, &id).await?;
    let mut session = session.lock().await;
    session.clear_history();
    info!(session = %id, "History cleared");
    Ok(Json(session.snapshot(Utc::now())))
}

// ── Tests ─────────────────────────────────────────────────────────────────
