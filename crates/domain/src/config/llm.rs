use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM provider system
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Startup policy for LLM providers.
    ///
    /// - `allow_none` (default): the gateway boots even if zero providers
    ///   init; sessions and readiness still work, and the turn endpoints
    ///   return errors until credentials are configured.
    /// - `require_one`: abort startup if no providers successfully init.
    #[serde(default)]
    pub startup_policy: LlmStartupPolicy,
    /// Per-request timeout for provider HTTP calls, in seconds.
    #[serde(default = "d_120")]
    pub request_timeout_secs: u64,
    /// Provider id used for turns. When `None`, the first registered
    /// provider is used.
    #[serde(default)]
    pub default_provider: Option<String>,
    /// Registered LLM providers (data-driven: adding a provider = adding config).
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            startup_policy: LlmStartupPolicy::AllowNone,
            request_timeout_secs: 120,
            default_provider: None,
            providers: Vec::new(),
        }
    }
}

/// Controls how the gateway handles LLM provider initialization at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LlmStartupPolicy {
    /// Boot even if no LLM providers initialize. Init errors are
    /// reported in `/v1/models/readiness`.
    #[default]
    AllowNone,
    /// Abort startup if no LLM providers successfully initialize.
    RequireOne,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    pub kind: ProviderKind,
    pub base_url: String,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub default_model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Anthropic,
    OpenaiCompat,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Env var containing the API key.
    #[serde(default)]
    pub env: Option<String>,
    /// Direct key (for config-only setups; prefer env).
    #[serde(default)]
    pub key: Option<String>,
}

// ── serde default helpers ───────────────────────────────────────────

fn d_120() -> u64 {
    120
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_config_default_has_no_providers() {
        let cfg = LlmConfig::default();
        assert!(cfg.providers.is_empty());
        assert_eq!(cfg.startup_policy, LlmStartupPolicy::AllowNone);
        assert_eq!(cfg.request_timeout_secs, 120);
    }

    #[test]
    fn provider_config_deserializes_from_toml() {
        let toml_str = r#"
            startup_policy = "require_one"

            [[providers]]
            id = "anthropic"
            kind = "anthropic"
            base_url = "https://api.anthropic.com"
            default_model = "claude-sonnet-4-20250514"

            [providers.auth]
            env = "ANTHROPIC_API_KEY"
        "#;
        let cfg: LlmConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.startup_policy, LlmStartupPolicy::RequireOne);
        assert_eq!(cfg.providers.len(), 1);
        assert_eq!(cfg.providers[0].kind, ProviderKind::Anthropic);
        assert_eq!(cfg.providers[0].auth.env.as_deref(), Some("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn openai_compat_kind_parses() {
        let json = r#"{"id":"openai","kind":"openai_compat","base_url":"https://api.openai.com/v1"}"#;
        let pc: ProviderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(pc.kind, ProviderKind::OpenaiCompat);
    }
}
