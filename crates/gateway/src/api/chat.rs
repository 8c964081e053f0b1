//! Tool-mode turn endpoint.
//!
//! `POST /v1/chat` lets the model drive data capture through the
//! `store_user_data` / `get_collected_data` tools.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::runtime::run_tool_turn;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestBody {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponseBody {
    pub response: String,
    pub session_id: String,
    pub collected_data: BTreeMap<String, String>,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequestBody>,
) -> impl IntoResponse {
    // Pre-flight: tool mode always needs a provider.
    let provider = match state.llm.default() {
        Some(p) => p,
        None => {
            return super::turn_error_response(&state, crate::runtime::TurnError::NoProvider);
        }
    };

    // Sessionless requests mint the session ID up front so each new
    // session locks on its own key.
    let session_id = crate::runtime::session_lock::turn_session_id(body.session_id.as_deref());
    let _permit = match state.session_locks.acquire(&session_id).await {
        Ok(p) => p,
        Err(e) => {
            return super::error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let result = run_tool_turn(
        &state.sessions,
        &state.config.intake,
        &provider,
        Some(&session_id),
        &body.message,
    )
    .await;

    match result {
        Ok(outcome) => Json(ChatResponseBody {
            response: outcome.response,
            session_id: outcome.session_id,
            collected_data: outcome.collected.unwrap_or_default(),
        })
        .into_response(),
        Err(e) => super::turn_error_response(&state, e),
    }
}
