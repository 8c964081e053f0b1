//! Session management API endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Serialize;

use ne_sessions::SessionEntry;

use crate::state::AppState;

/// Wire shape for one session (camelCase, summary fields only; the
/// transcript never leaves the server).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub cursor: usize,
    pub complete: bool,
    pub collected_data: std::collections::BTreeMap<String, String>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl From<SessionEntry> for SessionView {
    fn from(e: SessionEntry) -> Self {
        Self {
            session_id: e.session_id,
            created_at: e.created_at,
            updated_at: e.updated_at,
            cursor: e.intake.cursor(),
            complete: e.intake.is_complete(),
            collected_data: e.intake.collected().clone(),
            input_tokens: e.input_tokens,
            output_tokens: e.output_tokens,
            total_tokens: e.total_tokens,
        }
    }
}

// ── GET /v1/sessions ──────────────────────────────────────────────────

pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let mut sessions: Vec<SessionView> =
        state.sessions.list().into_iter().map(Into::into).collect();
    sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Json(serde_json::json!({
        "count": sessions.len(),
        "sessions": sessions,
    }))
}

// ── GET /v1/sessions/:id ──────────────────────────────────────────────

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.sessions.get(&id) {
        Some(entry) => Json(SessionView::from(entry)).into_response(),
        None => super::error_response(StatusCode::NOT_FOUND, format!("unknown session: {id}")),
    }
}

// ── POST /v1/sessions/:id/reset ───────────────────────────────────────

pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    // Wait for any in-flight turn on this session before wiping it.
    let _permit = match state.session_locks.acquire(&id).await {
        Ok(p) => p,
        Err(e) => {
            return super::error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    match state.sessions.reset(&id, state.config.intake.catalog) {
        Some(entry) => Json(SessionView::from(entry)).into_response(),
        None => super::error_response(StatusCode::NOT_FOUND, format!("unknown session: {id}")),
    }
}
