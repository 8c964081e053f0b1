//! Tool-mode turn loop.
//!
//! The model drives data capture itself: each iteration sends the tool-mode
//! instruction, the full history, and the two tool definitions. Tool calls
//! are dispatched and their results appended, then the model is re-invoked,
//! until it answers with plain text or the loop cap is hit.

use std::sync::Arc;

use ne_domain::config::IntakeConfig;
use ne_domain::error::Error;
use ne_domain::tool::{ContentPart, Message, MessageContent, Role};
use ne_providers::{ChatRequest, ChatResponse, LlmProvider};
use ne_sessions::{catalog, SessionStore};

use super::prompts;
use super::tools::{dispatch_tool, intake_tool_definitions};
use super::{TurnError, TurnOutcome};

/// Run one tool-mode turn.
pub async fn run_tool_turn(
    sessions: &SessionStore,
    cfg: &IntakeConfig,
    provider: &Arc<dyn LlmProvider>,
    session_id: Option<&str>,
    message: &str,
) -> Result<TurnOutcome, TurnError> {
    let (entry, _is_new) = sessions.get_or_create(session_id, cfg.catalog);
    let sid = entry.session_id.clone();
    let fields = catalog(cfg.catalog);

    sessions
        .with_session(&sid, |e| e.history.push(Message::user(message)))
        .ok_or_else(|| TurnError::Internal(Error::Session(format!("session {sid} vanished"))))?;

    let system = prompts::tool_mode_instruction(fields);
    let tool_defs = intake_tool_definitions(fields);

    for loop_idx in 0..cfg.max_tool_loops {
        let history = sessions
            .with_session(&sid, |e| e.history.clone())
            .unwrap_or_default();

        let mut messages = vec![Message::system(&system)];
        messages.extend(history);

        let resp = provider
            .chat(ChatRequest {
                messages,
                tools: tool_defs.clone(),
                ..Default::default()
            })
            .await
            .map_err(TurnError::Provider)?;

        if let Some(usage) = resp.usage {
            sessions.record_usage(&sid, usage.prompt_tokens as u64, usage.completion_tokens as u64);
        }

        // Plain-text response terminates the loop.
        if resp.tool_calls.is_empty() {
            let response = if resp.content.is_empty() {
                tracing::warn!(session_id = %sid, "provider returned neither text nor tool calls");
                prompts::NO_REPLY_APOLOGY.to_string()
            } else {
                resp.content
            };
            return finish(sessions, &sid, response);
        }

        tracing::debug!(
            session_id = %sid,
            loop_idx,
            tool_calls = resp.tool_calls.len(),
            "dispatching tool calls"
        );

        let assistant_msg = build_assistant_tool_message(&resp);
        let results: Vec<Message> = resp
            .tool_calls
            .iter()
            .map(|call| {
                let (content, is_error) = dispatch_tool(sessions, &sid, call);
                if is_error {
                    Message::tool_error(&call.call_id, content)
                } else {
                    Message::tool_result(&call.call_id, content)
                }
            })
            .collect();

        sessions.with_session(&sid, |e| {
            e.history.push(assistant_msg);
            e.history.extend(results);
        });
    }

    // Cap exceeded: fail closed with a deterministic reply.
    tracing::warn!(
        session_id = %sid,
        max_tool_loops = cfg.max_tool_loops,
        "tool loop cap reached"
    );
    finish(sessions, &sid, prompts::LOOP_CAP_REPLY.to_string())
}

/// Append the final assistant turn and build the outcome.
fn finish(
    sessions: &SessionStore,
    session_id: &str,
    response: String,
) -> Result<TurnOutcome, TurnError> {
    let collected = sessions
        .with_session(session_id, |e| {
            e.history.push(Message::assistant(&response));
            e.intake.collected().clone()
        })
        .ok_or_else(|| {
            TurnError::Internal(Error::Session(format!("session {session_id} vanished")))
        })?;

    Ok(TurnOutcome {
        session_id: session_id.to_string(),
        response,
        collected: Some(collected),
    })
}

/// Turn a provider response carrying tool calls into the assistant message
/// that goes back into the history (text part first, then tool_use parts).
fn build_assistant_tool_message(resp: &ChatResponse) -> Message {
    let mut parts = Vec::new();
    if !resp.content.is_empty() {
        parts.push(ContentPart::Text {
            text: resp.content.clone(),
        });
    }
    for call in &resp.tool_calls {
        parts.push(ContentPart::ToolUse {
            id: call.call_id.clone(),
            name: call.tool_name.clone(),
            input: call.arguments.clone(),
        });
    }
    Message {
        role: Role::Assistant,
        content: MessageContent::Parts(parts),
    }
}
