//! Structured-mode turn endpoint.
//!
//! `POST /v1/intake` walks the questionnaire one message at a time. Wire
//! bodies are camelCase to match the client contract.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::runtime::run_intake_turn;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRequest {
    /// User message text.
    pub message: String,
    /// Session to continue; a new session is created when absent.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Force a fresh start for this session.
    #[serde(default)]
    pub is_initial: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeResponse {
    pub response: String,
    pub session_id: String,
    /// Present once collection is complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collected_data: Option<BTreeMap<String, String>>,
}

pub async fn intake(
    State(state): State<AppState>,
    Json(body): Json<IntakeRequest>,
) -> impl IntoResponse {
    // Serialize turns per session. Sessionless requests mint the session
    // ID up front so each new session locks on its own key.
    let session_id = crate::runtime::session_lock::turn_session_id(body.session_id.as_deref());
    let _permit = match state.session_locks.acquire(&session_id).await {
        Ok(p) => p,
        Err(e) => {
            return super::error_response(
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            );
        }
    };

    let provider = state.llm.default();
    let result = run_intake_turn(
        &state.sessions,
        &state.config.intake,
        provider.as_ref(),
        Some(&session_id),
        &body.message,
        body.is_initial,
    )
    .await;

    match result {
        Ok(outcome) => Json(IntakeResponse {
            response: outcome.response,
            session_id: outcome.session_id,
            collected_data: outcome.collected,
        })
        .into_response(),
        Err(e) => super::turn_error_response(&state, e),
    }
}
