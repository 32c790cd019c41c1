//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ActionResponse, ChatRequest, ErrorResponse, SessionListResponse, SessionView, SuccessResponse,
};
use super::AppState;
use crate::runtime::{MessageStore, StateStore};
use crate::session::Event;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session lifecycle
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        // SSE streaming
        .route("/api/sessions/:id/stream", get(stream_session))
        // User actions
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/confirm", post(confirm_pending))
        .route("/api/sessions/:id/reject", post(reject_pending))
        .route("/api/sessions/:id/voice", post(toggle_voice))
        .route("/api/sessions/:id/wallet/connect", post(connect_wallet))
        .route("/api/sessions/:id/wallet/disconnect", post(disconnect_wallet))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Sessions
// ============================================================

async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    Json(SessionListResponse {
        sessions: state.sessions.store().list_sessions(),
    })
}

async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let id = state.sessions.create().await.map_err(AppError::Internal)?;
    let view = load_view(&state, &id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(load_view(&state, &id).await?))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.remove(&id).await.map_err(AppError::NotFound)?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn load_view(state: &AppState, id: &str) -> Result<SessionView, AppError> {
    let store = state.sessions.store();
    let messages = store.get_messages(id).await.map_err(AppError::NotFound)?;
    let chat = store.get_state(id).await.map_err(AppError::NotFound)?;
    Ok(SessionView::new(id, messages, &chat))
}

// ============================================================
// SSE Streaming
// ============================================================

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Subscribe before reading so nothing falls between snapshot and stream
    let broadcast_rx = state
        .sessions
        .subscribe(&id)
        .await
        .map_err(AppError::NotFound)?;
    let init = load_view(&state, &id).await?;

    Ok(sse_stream(init, broadcast_rx))
}

// ============================================================
// User Actions
// ============================================================

async fn dispatch(
    state: &AppState,
    id: &str,
    event: Event,
) -> Result<Json<ActionResponse>, AppError> {
    if !state.sessions.store().contains(id) {
        return Err(AppError::NotFound(format!("Session not found: {id}")));
    }

    state
        .sessions
        .send_event(id, event)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(ActionResponse { queued: true }))
}

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    dispatch(&state, &id, Event::UserMessage { text: req.text }).await
}

async fn confirm_pending(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    dispatch(&state, &id, Event::ConfirmPending).await
}

async fn reject_pending(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    dispatch(&state, &id, Event::RejectPending).await
}

async fn toggle_voice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    dispatch(&state, &id, Event::ToggleVoiceCapture).await
}

async fn connect_wallet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    dispatch(&state, &id, Event::ConnectWallet).await
}

async fn disconnect_wallet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    dispatch(&state, &id, Event::DisconnectWallet).await
}

async fn get_version() -> &'static str {
    concat!("intellichain ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
