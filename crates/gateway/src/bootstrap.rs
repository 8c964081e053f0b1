//! AppState construction extracted from `main.rs`.

use std::sync::Arc;

use anyhow::Context;

use ne_domain::config::{Config, ConfigSeverity, LlmStartupPolicy};
use ne_providers::registry::ProviderRegistry;
use ne_sessions::SessionStore;

use crate::runtime::session_lock::SessionLockMap;
use crate::state::AppState;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── LLM providers ────────────────────────────────────────────────
    let llm = Arc::new(
        ProviderRegistry::from_config(&config.llm).context("initializing LLM providers")?,
    );
    if llm.is_empty() {
        if config.llm.startup_policy == LlmStartupPolicy::RequireOne {
            anyhow::bail!("startup_policy = require_one but no LLM provider initialized");
        }
        tracing::info!(
            "no LLM providers initialized; configure API keys to enable turn endpoints"
        );
    } else {
        tracing::info!(providers = llm.len(), "LLM provider registry ready");
    }

    // ── Sessions ─────────────────────────────────────────────────────
    let sessions = Arc::new(SessionStore::new());
    let session_locks = Arc::new(SessionLockMap::new());
    tracing::info!(catalog = ?config.intake.catalog, "session store ready");

    Ok(AppState {
        config,
        llm,
        sessions,
        session_locks,
    })
}
