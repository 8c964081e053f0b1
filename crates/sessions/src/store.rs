//! In-memory session store.
//!
//! Each session ID maps to a [`SessionEntry`] holding the intake state, the
//! conversation history, token counters, and timestamps. State lives for the
//! process lifetime only.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::intake::Intake;
use ne_domain::config::CatalogVariant;
use ne_domain::tool::Message;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session entry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single session tracked by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEntry {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
    /// Questionnaire state.
    pub intake: Intake,
    /// Conversation transcript in provider-agnostic form.
    #[serde(default)]
    pub history: Vec<Message>,
}

impl SessionEntry {
    fn new(session_id: String, variant: CatalogVariant) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            created_at: now,
            updated_at: now,
            input_tokens: 0,
            output_tokens: 0,
            total_tokens: 0,
            intake: Intake::new(variant),
            history: Vec::new(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// In-memory session store shared across HTTP handlers.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a session by its ID.
    pub fn get(&self, session_id: &str) -> Option<SessionEntry> {
        self.sessions.read().get(session_id).cloned()
    }

    /// Resolve or create a session. When `session_id` is `None` (or unknown)
    /// a fresh session with a minted UUID is created. Returns
    /// `(snapshot, is_new)`.
    pub fn get_or_create(
        &self,
        session_id: Option<&str>,
        variant: CatalogVariant,
    ) -> (SessionEntry, bool) {
        // Fast path: session already exists.
        if let Some(id) = session_id {
            let sessions = self.sessions.read();
            if let Some(entry) = sessions.get(id) {
                return (entry.clone(), false);
            }
        }

        // Slow path: create new session.
        let id = match session_id {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        let entry = SessionEntry::new(id.clone(), variant);

        let mut sessions = self.sessions.write();
        // A concurrent request may have created the same ID in between.
        let entry = sessions.entry(id.clone()).or_insert(entry).clone();

        tracing::debug!(session_id = %id, "session created");
        (entry, true)
    }

    /// Run a closure against the live entry for a session, returning its
    /// result. `None` when the session does not exist. The entry's
    /// `updated_at` is touched on every call.
    pub fn with_session<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut SessionEntry) -> R,
    ) -> Option<R> {
        let mut sessions = self.sessions.write();
        let entry = sessions.get_mut(session_id)?;
        let result = f(entry);
        entry.updated_at = Utc::now();
        Some(result)
    }

    /// Update token counters for a session.
    pub fn record_usage(&self, session_id: &str, input_tokens: u64, output_tokens: u64) {
        let mut sessions = self.sessions.write();
        if let Some(entry) = sessions.get_mut(session_id) {
            entry.input_tokens += input_tokens;
            entry.output_tokens += output_tokens;
            entry.total_tokens += input_tokens + output_tokens;
            entry.updated_at = Utc::now();
        }
    }

    /// Reset a session back to an empty intake, keeping the same ID.
    pub fn reset(&self, session_id: &str, variant: CatalogVariant) -> Option<SessionEntry> {
        let mut sessions = self.sessions.write();
        let entry = sessions.get_mut(session_id)?;
        *entry = SessionEntry::new(session_id.to_owned(), variant);
        tracing::info!(session_id = %session_id, "session reset");
        Some(entry.clone())
    }

    /// List all session entries.
    pub fn list(&self) -> Vec<SessionEntry> {
        self.sessions.read().values().cloned().collect()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_sessions_with_minted_ids() {
        let store = SessionStore::new();
        let (a, new_a) = store.get_or_create(None, CatalogVariant::Full);
        let (b, new_b) = store.get_or_create(None, CatalogVariant::Full);
        assert!(new_a && new_b);
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn known_id_returns_existing_entry() {
        let store = SessionStore::new();
        let (created, _) = store.get_or_create(None, CatalogVariant::Minimal);
        let (found, is_new) =
            store.get_or_create(Some(&created.session_id), CatalogVariant::Minimal);
        assert!(!is_new);
        assert_eq!(found.session_id, created.session_id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_id_creates_a_session_under_that_id() {
        let store = SessionStore::new();
        let (entry, is_new) = store.get_or_create(Some("client-chosen"), CatalogVariant::Full);
        assert!(is_new);
        assert_eq!(entry.session_id, "client-chosen");
        assert!(store.get("client-chosen").is_some());
    }

    #[test]
    fn with_session_mutates_the_live_entry() {
        let store = SessionStore::new();
        let (entry, _) = store.get_or_create(None, CatalogVariant::Minimal);
        let field = store
            .with_session(&entry.session_id, |e| {
                e.intake.record_answer("Ada").map(|f| f.key)
            })
            .unwrap();
        assert_eq!(field, Some("name"));

        let after = store.get(&entry.session_id).unwrap();
        assert_eq!(after.intake.cursor(), 1);
        assert!(after.updated_at >= entry.updated_at);
    }

    #[test]
    fn with_session_on_missing_id_returns_none() {
        let store = SessionStore::new();
        assert!(store.with_session("ghost", |_| ()).is_none());
    }

    #[test]
    fn record_usage_accumulates() {
        let store = SessionStore::new();
        let (entry, _) = store.get_or_create(None, CatalogVariant::Full);
        store.record_usage(&entry.session_id, 10, 5);
        store.record_usage(&entry.session_id, 3, 2);
        let after = store.get(&entry.session_id).unwrap();
        assert_eq!(after.input_tokens, 13);
        assert_eq!(after.output_tokens, 7);
        assert_eq!(after.total_tokens, 20);
    }

    #[test]
    fn reset_clears_intake_but_keeps_the_id() {
        let store = SessionStore::new();
        let (entry, _) = store.get_or_create(None, CatalogVariant::Minimal);
        store.with_session(&entry.session_id, |e| {
            e.intake.record_answer("Ada");
            e.history.push(Message::user("hi"));
        });
        let reset = store.reset(&entry.session_id, CatalogVariant::Minimal).unwrap();
        assert_eq!(reset.session_id, entry.session_id);
        assert_eq!(reset.intake.cursor(), 0);
        assert!(reset.history.is_empty());
    }
}
