//! Provider registry.
//!
//! Constructs and holds all configured LLM provider instances. At startup the
//! registry reads the [`LlmConfig`], resolves authentication (env vars, direct
//! keys), and instantiates the appropriate adapter for each configured provider.

use crate::anthropic::AnthropicProvider;
use crate::openai_compat::OpenAiCompatProvider;
use crate::traits::LlmProvider;
use ne_domain::config::{LlmConfig, ProviderKind};
use ne_domain::error::Result;
use std::collections::HashMap;
use std::sync::Arc;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ProviderRegistry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A provider that failed to initialize at startup, kept for readiness
/// reporting.
#[derive(Debug, Clone)]
pub struct InitError {
    pub provider_id: String,
    pub kind: ProviderKind,
    pub error: String,
}

/// Holds all instantiated LLM providers.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
    default_provider: Option<String>,
    init_errors: Vec<InitError>,
}

impl ProviderRegistry {
    /// Build the registry from the application's [`LlmConfig`].
    ///
    /// Each entry in `config.providers` is instantiated using the appropriate
    /// adapter based on its `kind`. Auth keys are resolved eagerly (env vars
    /// are read at this point).
    ///
    /// Providers that fail to initialize are logged and skipped rather than
    /// aborting the entire startup; failures are retained in `init_errors`
    /// so the readiness endpoint can surface them.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let mut providers: HashMap<String, Arc<dyn LlmProvider>> = HashMap::new();
        let mut init_errors = Vec::new();
        let timeout = config.request_timeout_secs;

        for pc in &config.providers {
            let result: Result<Arc<dyn LlmProvider>> = match pc.kind {
                ProviderKind::Anthropic => AnthropicProvider::from_config(pc, timeout)
                    .map(|p| Arc::new(p) as Arc<dyn LlmProvider>),
                ProviderKind::OpenaiCompat => OpenAiCompatProvider::from_config(pc, timeout)
                    .map(|p| Arc::new(p) as Arc<dyn LlmProvider>),
            };

            match result {
                Ok(provider) => {
                    tracing::info!(
                        provider_id = %pc.id,
                        kind = ?pc.kind,
                        "registered LLM provider"
                    );
                    providers.insert(pc.id.clone(), provider);
                }
                Err(e) => {
                    tracing::warn!(
                        provider_id = %pc.id,
                        kind = ?pc.kind,
                        error = %e,
                        "failed to initialize LLM provider, skipping"
                    );
                    init_errors.push(InitError {
                        provider_id: pc.id.clone(),
                        kind: pc.kind,
                        error: e.to_string(),
                    });
                }
            }
        }

        if providers.is_empty() && !config.providers.is_empty() {
            tracing::warn!(
                "no LLM providers initialized; turn endpoints will fail \
                 until auth is configured"
            );
        }

        Ok(Self {
            providers,
            default_provider: config.default_provider.clone(),
            init_errors,
        })
    }

    /// Look up a provider by its config id.
    pub fn get(&self, provider_id: &str) -> Option<Arc<dyn LlmProvider>> {
        self.providers.get(provider_id).cloned()
    }

    /// The provider turns use by default: the configured `default_provider`
    /// when set, otherwise an arbitrary registered provider.
    pub fn default(&self) -> Option<Arc<dyn LlmProvider>> {
        if let Some(ref id) = self.default_provider {
            return self.get(id);
        }
        self.providers.values().next().cloned()
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// List all registered provider IDs (sorted).
    pub fn list_providers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Providers that failed to initialize at startup.
    pub fn init_errors(&self) -> &[InitError] {
        &self.init_errors
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use ne_domain::config::{AuthConfig, ProviderConfig};

    fn provider_cfg(id: &str, key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            id: id.into(),
            kind: ProviderKind::Anthropic,
            base_url: "https://api.anthropic.com".into(),
            auth: AuthConfig {
                env: None,
                key: key.map(String::from),
            },
            default_model: None,
        }
    }

    #[test]
    fn empty_config_builds_empty_registry() {
        let registry = ProviderRegistry::from_config(&LlmConfig::default()).unwrap();
        assert!(registry.is_empty());
        assert!(registry.default().is_none());
        assert!(registry.init_errors().is_empty());
    }

    #[test]
    fn failed_auth_is_recorded_not_fatal() {
        let config = LlmConfig {
            providers: vec![provider_cfg("broken", None)],
            ..Default::default()
        };
        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.init_errors().len(), 1);
        assert_eq!(registry.init_errors()[0].provider_id, "broken");
    }

    #[test]
    fn default_provider_is_honored() {
        let config = LlmConfig {
            default_provider: Some("b".into()),
            providers: vec![provider_cfg("a", Some("k1")), provider_cfg("b", Some("k2"))],
            ..Default::default()
        };
        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.default().unwrap().provider_id(), "b");
        assert_eq!(registry.list_providers(), vec!["a", "b"]);
    }
}
