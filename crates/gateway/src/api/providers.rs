//! Provider readiness endpoint, used as a health probe.

use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let providers = state.llm.list_providers();
    let init_errors: Vec<serde_json::Value> = state
        .llm
        .init_errors()
        .iter()
        .map(|e| {
            serde_json::json!({
                "providerId": e.provider_id,
                "kind": format!("{:?}", e.kind),
                "error": e.error,
            })
        })
        .collect();

    Json(serde_json::json!({
        "ready": !providers.is_empty(),
        "providers": providers,
        "count": providers.len(),
        "initErrors": init_errors,
    }))
}
