//! Integration tests for the tool-mode turn loop: full round-trip with a
//! scripted provider, no network. All tests are pure and deterministic.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use ne_domain::config::{CatalogVariant, IntakeConfig};
use ne_domain::error::{Error, Result};
use ne_domain::tool::{ContentPart, MessageContent, Role, ToolCall};
use ne_gateway::runtime::prompts::{LOOP_CAP_REPLY, NO_REPLY_APOLOGY};
use ne_gateway::runtime::run_tool_turn;
use ne_providers::{ChatRequest, ChatResponse, LlmProvider, Usage};
use ne_sessions::SessionStore;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scripted provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct ScriptedProvider {
    responses: Mutex<VecDeque<ChatResponse>>,
    /// Returned when the script runs out (used to simulate a provider that
    /// never stops asking for tools).
    fallback: Option<ChatResponse>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(responses: Vec<ChatResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            fallback: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn looping(fallback: ChatResponse) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: Some(fallback),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(&self, _req: ChatRequest) -> Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(resp) = self.responses.lock().pop_front() {
            return Ok(resp);
        }
        match &self.fallback {
            Some(resp) => Ok(resp.clone()),
            None => Err(Error::Other("script exhausted".into())),
        }
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }
}

fn text_response(text: &str) -> ChatResponse {
    ChatResponse {
        content: text.into(),
        tool_calls: Vec::new(),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "scripted".into(),
        finish_reason: Some("stop".into()),
    }
}

fn tool_response(name: &str, args: serde_json::Value) -> ChatResponse {
    ChatResponse {
        content: String::new(),
        tool_calls: vec![ToolCall {
            call_id: format!("call_{name}"),
            tool_name: name.into(),
            arguments: args,
        }],
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "scripted".into(),
        finish_reason: Some("tool_calls".into()),
    }
}

fn minimal_cfg() -> IntakeConfig {
    IntakeConfig {
        catalog: CatalogVariant::Minimal,
        max_tool_loops: 3,
        llm_acknowledgments: false,
    }
}

fn as_provider(p: &Arc<ScriptedProvider>) -> Arc<dyn LlmProvider> {
    p.clone() as Arc<dyn LlmProvider>
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Happy path
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn store_then_final_text() {
    let sessions = SessionStore::new();
    let scripted = ScriptedProvider::new(vec![
        tool_response(
            "store_user_data",
            serde_json::json!({"field": "name", "value": "Ada"}),
        ),
        text_response("Thanks Ada"),
    ]);
    let provider = as_provider(&scripted);

    let outcome = run_tool_turn(&sessions, &minimal_cfg(), &provider, None, "I'm Ada")
        .await
        .unwrap();

    assert_eq!(outcome.response, "Thanks Ada");
    let collected = outcome.collected.unwrap();
    assert_eq!(collected.get("name").map(String::as_str), Some("Ada"));
    // One invocation for the tool call, one for the final text.
    assert_eq!(scripted.call_count(), 2);
}

#[tokio::test]
async fn usage_is_accumulated_across_iterations() {
    let sessions = SessionStore::new();
    let scripted = ScriptedProvider::new(vec![
        tool_response("get_collected_data", serde_json::json!({})),
        text_response("Nothing yet."),
    ]);
    let provider = as_provider(&scripted);

    let outcome = run_tool_turn(&sessions, &minimal_cfg(), &provider, None, "what do you have?")
        .await
        .unwrap();

    let entry = sessions.get(&outcome.session_id).unwrap();
    // Two iterations at 10 + 5 tokens each.
    assert_eq!(entry.input_tokens, 20);
    assert_eq!(entry.output_tokens, 10);
    assert_eq!(entry.total_tokens, 30);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Degenerate provider behavior
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn unknown_tool_feeds_back_an_error_and_the_loop_continues() {
    let sessions = SessionStore::new();
    let scripted = ScriptedProvider::new(vec![
        tool_response("transfer_funds", serde_json::json!({})),
        text_response("Sorry, I can't do that."),
    ]);
    let provider = as_provider(&scripted);

    let outcome = run_tool_turn(&sessions, &minimal_cfg(), &provider, None, "send money")
        .await
        .unwrap();

    assert_eq!(outcome.response, "Sorry, I can't do that.");
    assert_eq!(scripted.call_count(), 2);

    // The error tool-result made it into the history.
    let entry = sessions.get(&outcome.session_id).unwrap();
    let has_error_result = entry.history.iter().any(|m| {
        m.role == Role::Tool
            && matches!(
                &m.content,
                MessageContent::Parts(parts) if parts.iter().any(|p| matches!(
                    p,
                    ContentPart::ToolResult { is_error: true, .. }
                ))
            )
    });
    assert!(has_error_result);
}

#[tokio::test]
async fn endless_tool_requests_hit_the_cap() {
    let sessions = SessionStore::new();
    let scripted = ScriptedProvider::looping(tool_response(
        "get_collected_data",
        serde_json::json!({}),
    ));
    let provider = as_provider(&scripted);

    let cfg = minimal_cfg();
    let outcome = run_tool_turn(&sessions, &cfg, &provider, None, "loop forever")
        .await
        .unwrap();

    assert_eq!(outcome.response, LOOP_CAP_REPLY);
    assert_eq!(scripted.call_count(), cfg.max_tool_loops);
}

#[tokio::test]
async fn empty_response_yields_the_apology() {
    let sessions = SessionStore::new();
    let scripted = ScriptedProvider::new(vec![text_response("")]);
    let provider = as_provider(&scripted);

    let outcome = run_tool_turn(&sessions, &minimal_cfg(), &provider, None, "hello?")
        .await
        .unwrap();

    assert_eq!(outcome.response, NO_REPLY_APOLOGY);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// get_collected_data semantics
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn get_collected_data_is_idempotent_between_mutations() {
    let sessions = SessionStore::new();
    let scripted = ScriptedProvider::new(vec![
        tool_response(
            "store_user_data",
            serde_json::json!({"field": "cash", "value": "5000"}),
        ),
        tool_response("get_collected_data", serde_json::json!({})),
        tool_response("get_collected_data", serde_json::json!({})),
        text_response("done"),
    ]);
    let provider = as_provider(&scripted);

    let cfg = IntakeConfig {
        max_tool_loops: 8,
        ..minimal_cfg()
    };
    let outcome = run_tool_turn(&sessions, &cfg, &provider, None, "I have $5000 cash")
        .await
        .unwrap();

    // Both get_collected_data results are identical.
    let entry = sessions.get(&outcome.session_id).unwrap();
    let results: Vec<&str> = entry
        .history
        .iter()
        .filter(|m| m.role == Role::Tool)
        .filter_map(|m| match &m.content {
            MessageContent::Parts(parts) => parts.iter().find_map(|p| match p {
                ContentPart::ToolResult { content, is_error: false, .. }
                    if content.starts_with('{') =>
                {
                    Some(content.as_str())
                }
                _ => None,
            }),
            _ => None,
        })
        .collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0], results[1]);
    assert!(results[0].contains("5000"));
}
