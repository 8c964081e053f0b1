pub mod chat;
pub mod intake;
pub mod providers;
pub mod sessions;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::runtime::TurnError;
use crate::state::AppState;

/// Build the full API router.
pub fn router() -> Router<AppState> {
    Router::new()
        // Turn endpoints
        .route("/v1/intake", post(intake::intake))
        .route("/v1/chat", post(chat::chat))
        // Session management
        .route("/v1/sessions", get(sessions::list_sessions))
        .route("/v1/sessions/:id", get(sessions::get_session))
        .route("/v1/sessions/:id/reset", post(sessions::reset_session))
        // Provider readiness (used by health probes)
        .route("/v1/models/readiness", get(providers::readiness))
}

/// Map a turn failure onto an HTTP error response. Always `{"error": ...}`.
pub(crate) fn turn_error_response(state: &AppState, err: TurnError) -> Response {
    match err {
        TurnError::NoProvider => {
            let init_errors: Vec<String> = state
                .llm
                .init_errors()
                .iter()
                .map(|e| format!("{}: {}", e.provider_id, e.error))
                .collect();
            let detail = if init_errors.is_empty() {
                "no LLM provider configured".to_string()
            } else {
                format!("no LLM provider available ({})", init_errors.join("; "))
            };
            error_response(StatusCode::SERVICE_UNAVAILABLE, detail)
        }
        TurnError::Provider(e) => {
            tracing::error!(error = %e, "provider call failed");
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
        TurnError::Internal(e) => {
            tracing::error!(error = %e, "turn failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}
