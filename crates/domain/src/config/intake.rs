use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Intake
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Which question catalog new sessions use.
    #[serde(default)]
    pub catalog: CatalogVariant,
    /// Upper bound on tool-invocation rounds within a single chat turn.
    #[serde(default = "d_8")]
    pub max_tool_loops: usize,
    /// When true, mid-intake answers are acknowledged by the model
    /// before the next scripted question is appended. When false the
    /// whole turn is deterministic.
    #[serde(default)]
    pub llm_acknowledgments: bool,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogVariant::Full,
            max_tool_loops: 8,
            llm_acknowledgments: false,
        }
    }
}

/// The two built-in questionnaire catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CatalogVariant {
    /// Full 14-question financial picture.
    #[default]
    Full,
    /// Short 5-question variant for quick demos.
    Minimal,
}

// ── serde default helpers ───────────────────────────────────────────

fn d_8() -> usize {
    8
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intake_config_defaults() {
        let cfg: IntakeConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.catalog, CatalogVariant::Full);
        assert_eq!(cfg.max_tool_loops, 8);
        assert!(!cfg.llm_acknowledgments);
    }

    #[test]
    fn minimal_catalog_parses() {
        let cfg: IntakeConfig = toml::from_str(r#"catalog = "minimal""#).unwrap();
        assert_eq!(cfg.catalog, CatalogVariant::Minimal);
    }
}
