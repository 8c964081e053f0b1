//! Validation behavior for full configs loaded from TOML.

use ne_domain::config::{CatalogVariant, Config, ConfigSeverity, LlmStartupPolicy};

#[test]
fn empty_config_is_usable_with_a_warning() {
    let cfg: Config = toml::from_str("").unwrap();
    assert_eq!(cfg.server.port, 3000);
    assert_eq!(cfg.llm.startup_policy, LlmStartupPolicy::AllowNone);
    assert_eq!(cfg.intake.catalog, CatalogVariant::Full);

    let issues = cfg.validate();
    // No providers configured is a warning, not an error.
    assert!(issues
        .iter()
        .all(|e| e.severity != ConfigSeverity::Error));
    assert!(issues
        .iter()
        .any(|e| e.field == "llm.providers"));
}

#[test]
fn full_config_round_trips() {
    let toml_str = r#"
        [server]
        port = 8080
        host = "0.0.0.0"

        [llm]
        default_provider = "anthropic"
        request_timeout_secs = 30

        [[llm.providers]]
        id = "anthropic"
        kind = "anthropic"
        base_url = "https://api.anthropic.com"
        default_model = "claude-sonnet-4-20250514"
        auth = { env = "ANTHROPIC_API_KEY" }

        [intake]
        catalog = "minimal"
        max_tool_loops = 4
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.llm.request_timeout_secs, 30);
    assert_eq!(cfg.llm.default_provider.as_deref(), Some("anthropic"));
    assert_eq!(cfg.intake.catalog, CatalogVariant::Minimal);
    assert_eq!(cfg.intake.max_tool_loops, 4);

    let issues = cfg.validate();
    assert!(issues.is_empty(), "unexpected issues: {issues:?}");
}

#[test]
fn dangling_default_provider_is_an_error() {
    let toml_str = r#"
        [llm]
        default_provider = "nope"
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    let issues = cfg.validate();
    assert!(issues
        .iter()
        .any(|e| e.severity == ConfigSeverity::Error && e.field == "llm.default_provider"));
}

#[test]
fn zero_tool_loops_is_an_error() {
    let toml_str = r#"
        [intake]
        max_tool_loops = 0
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert!(cfg
        .validate()
        .iter()
        .any(|e| e.field == "intake.max_tool_loops"));
}
