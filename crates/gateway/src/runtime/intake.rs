//! Structured-mode turn protocol.
//!
//! The server owns the conversation: it asks catalog questions in order,
//! records each answer, and only consults the LLM once collection is
//! complete (or, optionally, for mid-intake acknowledgments). Any answer
//! or mutation applied before a provider failure stays applied.

use std::collections::BTreeMap;
use std::sync::Arc;

use ne_domain::config::IntakeConfig;
use ne_domain::error::Error;
use ne_domain::tool::Message;
use ne_providers::{ChatRequest, LlmProvider};
use ne_sessions::{catalog, SessionStore};

use super::mutation::{confirmation, parse_mutation};
use super::prompts;
use super::{TurnError, TurnOutcome};

/// Run one structured-mode turn.
///
/// `provider` may be `None`; it is only required once the questionnaire is
/// complete (or when `llm_acknowledgments` is enabled mid-intake).
pub async fn run_intake_turn(
    sessions: &SessionStore,
    cfg: &IntakeConfig,
    provider: Option<&Arc<dyn LlmProvider>>,
    session_id: Option<&str>,
    message: &str,
    is_initial: bool,
) -> Result<TurnOutcome, TurnError> {
    let (entry, is_new) = sessions.get_or_create(session_id, cfg.catalog);
    let sid = entry.session_id.clone();
    let fields = catalog(cfg.catalog);

    // ── Greeting turn ────────────────────────────────────────────────
    if is_initial || message.trim().eq_ignore_ascii_case("start") || is_new {
        if !is_new {
            sessions.reset(&sid, cfg.catalog);
        }
        let greeting = prompts::greeting(fields);
        sessions
            .with_session(&sid, |e| e.history.push(Message::assistant(&greeting)))
            .ok_or_else(|| TurnError::Internal(Error::Session(format!("session {sid} vanished"))))?;
        tracing::info!(session_id = %sid, "intake started");
        return Ok(TurnOutcome {
            session_id: sid,
            response: greeting,
            collected: None,
        });
    }

    // ── Collection phase ─────────────────────────────────────────────
    if !entry.intake.is_complete() {
        let (answered, now_complete, next, collected) = sessions
            .with_session(&sid, |e| {
                e.history.push(Message::user(message));
                let answered = e.intake.record_answer(message);
                (
                    answered,
                    e.intake.is_complete(),
                    e.intake.current_question(),
                    e.intake.collected().clone(),
                )
            })
            .ok_or_else(|| TurnError::Internal(Error::Session(format!("session {sid} vanished"))))?;

        tracing::debug!(
            session_id = %sid,
            field = answered.map(|f| f.key).unwrap_or(""),
            complete = now_complete,
            "answer recorded"
        );

        if now_complete {
            let response = prompts::COMPLETION_MESSAGE.to_string();
            sessions.with_session(&sid, |e| e.history.push(Message::assistant(&response)));
            return Ok(TurnOutcome {
                session_id: sid,
                response,
                collected: Some(collected),
            });
        }

        // Unreachable only when the catalog is empty, which validate()
        // does not allow to matter: record_answer returned a field, so
        // there is a current question.
        let next = match next {
            Some(f) => f,
            None => {
                return Err(TurnError::Internal(Error::Other(
                    "intake incomplete but no current question".into(),
                )))
            }
        };

        let response = if cfg.llm_acknowledgments {
            let (answered_field, history) = match answered {
                Some(f) => (
                    f,
                    sessions
                        .with_session(&sid, |e| e.history.clone())
                        .unwrap_or_default(),
                ),
                None => {
                    return Err(TurnError::Internal(Error::Other(
                        "no field was answered this turn".into(),
                    )))
                }
            };
            let provider = provider.ok_or(TurnError::NoProvider)?;
            let ack = acknowledge_with_llm(sessions, &sid, provider, answered_field, history).await?;
            format!("{ack} {}", next.prompt)
        } else {
            prompts::acknowledgment(next)
        };

        sessions.with_session(&sid, |e| e.history.push(Message::assistant(&response)));
        return Ok(TurnOutcome {
            session_id: sid,
            response,
            collected: None,
        });
    }

    // ── Advisor phase ────────────────────────────────────────────────
    let provider = provider.ok_or(TurnError::NoProvider)?;

    let (history, collected) = sessions
        .with_session(&sid, |e| {
            e.history.push(Message::user(message));
            (e.history.clone(), e.intake.collected().clone())
        })
        .ok_or_else(|| TurnError::Internal(Error::Session(format!("session {sid} vanished"))))?;

    let mut messages = vec![Message::system(prompts::advisor_instruction(&collected))];
    messages.extend(history);

    let resp = provider
        .chat(ChatRequest {
            messages,
            ..Default::default()
        })
        .await
        .map_err(TurnError::Provider)?;

    if let Some(usage) = resp.usage {
        sessions.record_usage(&sid, usage.prompt_tokens as u64, usage.completion_tokens as u64);
    }

    let raw = resp.content;
    let (response, collected): (String, BTreeMap<String, String>) =
        match parse_mutation(&raw) {
            Some(m) => {
                let updated = sessions
                    .with_session(&sid, |e| {
                        e.intake.set(m.field.clone(), m.value.clone());
                        e.intake.collected().clone()
                    })
                    .unwrap_or(collected);
                tracing::info!(session_id = %sid, field = %m.field, "data mutation applied");
                (confirmation(&m), updated)
            }
            None if raw.is_empty() => (prompts::NO_REPLY_APOLOGY.to_string(), collected),
            None => (raw, collected),
        };

    sessions.with_session(&sid, |e| e.history.push(Message::assistant(&response)));

    Ok(TurnOutcome {
        session_id: sid,
        response,
        collected: Some(collected),
    })
}

/// Consult the provider for a one-sentence acknowledgment of the answer
/// just recorded (the `llm_acknowledgments` sub-mode).
async fn acknowledge_with_llm(
    sessions: &SessionStore,
    session_id: &str,
    provider: &Arc<dyn LlmProvider>,
    answered: &'static ne_sessions::FieldDef,
    history: Vec<Message>,
) -> Result<String, TurnError> {
    let mut messages = vec![Message::system(prompts::extraction_instruction(answered))];
    messages.extend(history);

    let resp = provider
        .chat(ChatRequest {
            messages,
            ..Default::default()
        })
        .await
        .map_err(TurnError::Provider)?;

    if let Some(usage) = resp.usage {
        sessions.record_usage(
            session_id,
            usage.prompt_tokens as u64,
            usage.completion_tokens as u64,
        );
    }

    if resp.content.is_empty() {
        Ok("Got it.".to_string())
    } else {
        Ok(resp.content)
    }
}
