//! Tool definitions and dispatch for tool mode.
//!
//! Two tools are exposed to the model: `store_user_data` writes a single
//! field into the session's collected map, `get_collected_data` returns
//! everything gathered so far. Dispatch never fails the turn; bad input or
//! an unknown tool name produces an error tool-result that is fed back to
//! the model.

use ne_domain::tool::{ToolCall, ToolDefinition};
use ne_sessions::{FieldDef, SessionStore};

/// Build the tool definitions for a catalog. The `field` parameter is a
/// closed enum of the catalog's storage keys.
pub fn intake_tool_definitions(catalog: &[FieldDef]) -> Vec<ToolDefinition> {
    let keys: Vec<&str> = catalog.iter().map(|f| f.key).collect();

    vec![
        ToolDefinition {
            name: "store_user_data".into(),
            description: "Store one piece of the user's financial data. Call this \
                          whenever the user states a value for one of the fields."
                .into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "field": {
                        "type": "string",
                        "enum": keys,
                        "description": "Which field the value belongs to."
                    },
                    "value": {
                        "type": "string",
                        "description": "The value exactly as the user stated it."
                    }
                },
                "required": ["field", "value"]
            }),
        },
        ToolDefinition {
            name: "get_collected_data".into(),
            description: "Return all financial data collected so far as JSON.".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        },
    ]
}

/// Execute one tool call against a session. Returns `(content, is_error)`.
pub fn dispatch_tool(sessions: &SessionStore, session_id: &str, call: &ToolCall) -> (String, bool) {
    match call.tool_name.as_str() {
        "store_user_data" => {
            let field = call.arguments.get("field").and_then(|v| v.as_str());
            let value = call.arguments.get("value").and_then(|v| v.as_str());
            match (field, value) {
                (Some(field), Some(value)) => {
                    let stored = sessions
                        .with_session(session_id, |e| {
                            e.intake.set(field, value);
                        })
                        .is_some();
                    if stored {
                        tracing::debug!(session_id, field, "stored field via tool");
                        (format!("Stored {field}."), false)
                    } else {
                        ("Session not found.".into(), true)
                    }
                }
                _ => (
                    "store_user_data requires string arguments 'field' and 'value'.".into(),
                    true,
                ),
            }
        }
        "get_collected_data" => {
            let collected = sessions.with_session(session_id, |e| e.intake.collected().clone());
            match collected {
                Some(map) => (
                    serde_json::to_string(&map).unwrap_or_else(|_| "{}".into()),
                    false,
                ),
                None => ("Session not found.".into(), true),
            }
        }
        other => {
            tracing::warn!(tool_name = other, "model invoked unknown tool");
            (format!("Unknown tool: {other}"), true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ne_domain::config::CatalogVariant;
    use ne_sessions::catalog::MINIMAL_CATALOG;

    fn call(name: &str, args: serde_json::Value) -> ToolCall {
        ToolCall {
            call_id: "call_1".into(),
            tool_name: name.into(),
            arguments: args,
        }
    }

    #[test]
    fn definitions_expose_the_catalog_keys_as_an_enum() {
        let defs = intake_tool_definitions(MINIMAL_CATALOG);
        assert_eq!(defs.len(), 2);
        let schema = &defs[0].parameters;
        let keys = schema["properties"]["field"]["enum"].as_array().unwrap();
        assert_eq!(keys.len(), MINIMAL_CATALOG.len());
    }

    #[test]
    fn store_writes_the_field() {
        let store = SessionStore::new();
        let (entry, _) = store.get_or_create(None, CatalogVariant::Minimal);
        let (content, is_error) = dispatch_tool(
            &store,
            &entry.session_id,
            &call(
                "store_user_data",
                serde_json::json!({"field": "name", "value": "Ada"}),
            ),
        );
        assert!(!is_error, "{content}");
        let after = store.get(&entry.session_id).unwrap();
        assert_eq!(after.intake.collected().get("name").map(String::as_str), Some("Ada"));
    }

    #[test]
    fn store_with_missing_arguments_is_an_error_result() {
        let store = SessionStore::new();
        let (entry, _) = store.get_or_create(None, CatalogVariant::Minimal);
        let (_, is_error) = dispatch_tool(
            &store,
            &entry.session_id,
            &call("store_user_data", serde_json::json!({"field": "name"})),
        );
        assert!(is_error);
    }

    #[test]
    fn get_returns_serialized_map() {
        let store = SessionStore::new();
        let (entry, _) = store.get_or_create(None, CatalogVariant::Minimal);
        store.with_session(&entry.session_id, |e| e.intake.set("cash", "5000"));
        let (content, is_error) = dispatch_tool(
            &store,
            &entry.session_id,
            &call("get_collected_data", serde_json::json!({})),
        );
        assert!(!is_error);
        let map: std::collections::BTreeMap<String, String> =
            serde_json::from_str(&content).unwrap();
        assert_eq!(map.get("cash").map(String::as_str), Some("5000"));
    }

    #[test]
    fn unknown_tool_is_an_error_result_not_a_panic() {
        let store = SessionStore::new();
        let (entry, _) = store.get_or_create(None, CatalogVariant::Minimal);
        let (content, is_error) = dispatch_tool(
            &store,
            &entry.session_id,
            &call("delete_everything", serde_json::json!({})),
        );
        assert!(is_error);
        assert!(content.contains("delete_everything"));
    }
}
