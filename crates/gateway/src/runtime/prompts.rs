//! Prompt builders and fixed reply text.
//!
//! Structured mode keeps the LLM on a short leash: the instructions built
//! here pin down exactly what the model may say, and everything else
//! (question order, completion, mutations) is decided server-side.

use std::collections::BTreeMap;

use ne_sessions::{FieldDef, ASSET_KEYS, LIABILITY_KEYS};

/// Fixed reply when the model returns neither text nor tool calls.
pub const NO_REPLY_APOLOGY: &str =
    "Sorry, I wasn't able to come up with a response. Could you try rephrasing that?";

/// Fixed reply when the tool loop hits its iteration cap.
pub const LOOP_CAP_REPLY: &str =
    "Sorry, I couldn't finish processing that request. Please try again.";

/// Fixed reply once the last catalog question has been answered.
pub const COMPLETION_MESSAGE: &str =
    "That's everything I need, thank you! Ask me anything about your financial \
     picture and I'll do my best to help.";

/// Greeting returned on the initial turn. Always contains the first
/// catalog question.
pub fn greeting(catalog: &[FieldDef]) -> String {
    let first = catalog.first().map(|f| f.prompt).unwrap_or_default();
    format!(
        "Hi, I'm NestEgg. I'll walk you through a few questions to build a \
         picture of your finances. {first}"
    )
}

/// Deterministic mid-intake acknowledgment plus the next question.
pub fn acknowledgment(next: &FieldDef) -> String {
    format!("Got it. {}", next.prompt)
}

/// System instruction for the optional LLM-acknowledgment sub-mode.
///
/// The caller appends the literal next question to whatever the model
/// says, so the model is told not to ask anything itself.
pub fn extraction_instruction(answered: &FieldDef) -> String {
    format!(
        "You are a financial intake assistant. The user was just asked: \
         \"{}\". Their latest message is the answer; it has already been \
         recorded under the field \"{}\". Acknowledge it in one short, \
         friendly sentence. Do not ask any question of your own and do not \
         add anything else; the next question is appended automatically.",
        answered.prompt, answered.key
    )
}

/// System instruction for the advisor phase (collection complete).
///
/// Embeds the collected data, a best-effort numeric summary, and the two
/// mutation sentinels the model must emit verbatim when the user wants to
/// change a value.
pub fn advisor_instruction(collected: &BTreeMap<String, String>) -> String {
    let data = serde_json::to_string_pretty(collected).unwrap_or_else(|_| "{}".into());
    let summary = net_worth_summary(collected);

    format!(
        "You are NestEgg, a financial planning assistant. You have finished \
         collecting the user's financial data:\n\n{data}\n\n\
         {summary}\n\
         Net worth is assets minus liabilities. Assets are the fields: \
         {assets}. Liabilities are the fields: {liabilities}. Treat any \
         absent field as zero. The dollar figures above are a best-effort \
         parse of the user's free-text answers; prefer them for arithmetic \
         but fall back to the raw answers when they look wrong.\n\n\
         Answer the user's questions about their finances using this data.\n\n\
         If the user asks to change an existing value, reply with EXACTLY \
         this single line and nothing else:\n\
         UPDATE_DATA|field|value\n\
         If the user provides a new piece of financial data, reply with \
         EXACTLY this single line and nothing else:\n\
         ADD_DATA|field|value",
        assets = ASSET_KEYS.join(", "),
        liabilities = LIABILITY_KEYS.join(", "),
    )
}

/// System instruction for tool mode.
pub fn tool_mode_instruction(catalog: &[FieldDef]) -> String {
    let fields: Vec<&str> = catalog.iter().map(|f| f.key).collect();
    format!(
        "You are NestEgg, a financial planning assistant collecting a user's \
         financial data in conversation. The fields to collect are exactly: \
         {}. Whenever the user states a value for one of these fields, call \
         the store_user_data tool with that field and value. Call \
         get_collected_data when you need to see what has been gathered so \
         far. Ask for the fields one at a time, in order, and keep your \
         replies short.",
        fields.join(", ")
    )
}

// ── Net worth summary helpers ──────────────────────────────────────────

/// Best-effort numeric summary embedded in the advisor instruction.
fn net_worth_summary(collected: &BTreeMap<String, String>) -> String {
    let sum = |keys: &[&str]| -> f64 {
        keys.iter()
            .filter_map(|k| collected.get(*k))
            .map(|v| parse_amount(v))
            .sum()
    };
    let assets = sum(ASSET_KEYS);
    let liabilities = sum(LIABILITY_KEYS);

    format!(
        "Approximate totals parsed from the answers: assets ${assets:.0}, \
         liabilities ${liabilities:.0}, net worth ${:.0}.\n",
        assets - liabilities
    )
}

/// Parse a free-text money answer into a number.
///
/// Strips `$` and commas, understands `k`/`m` suffixes, and returns 0.0
/// for anything unparsable. Advisory only; the raw answer stays stored.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }

    let lower = cleaned.to_ascii_lowercase();
    let (number, multiplier) = if let Some(stripped) = lower.strip_suffix('k') {
        (stripped, 1_000.0)
    } else if let Some(stripped) = lower.strip_suffix('m') {
        (stripped, 1_000_000.0)
    } else {
        (lower.as_str(), 1.0)
    };

    number.parse::<f64>().map(|n| n * multiplier).unwrap_or(0.0)
}
