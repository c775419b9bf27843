// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Propdesk configuration system.

use propdesk_config::diagnostic::ConfigError;
use propdesk_config::model::PropdeskConfig;
use propdesk_config::{
    CompanyResolutionMode, load_and_validate_path, load_and_validate_str, load_config_from_str,
};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[agent]
name = "acme-desk"
log_level = "debug"

[telegram]
bot_token = "123:ABC"
webhook_secret = "hook-secret"

[storage]
database_path = "/tmp/propdesk-test.db"
wal_mode = false

[gateway]
host = "0.0.0.0"
port = 8080

[crm]
dialogue_enabled = false
auto_create_leads = false
company_resolution = "none"
returning_customer_threshold = 5
metadata_history_limit = 20

[crm.scoring]
name = 5
contact = 15
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "acme-desk");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.webhook_secret.as_deref(), Some("hook-secret"));
    assert_eq!(config.telegram.api_url, "https://api.telegram.org");
    assert_eq!(config.storage.database_path, "/tmp/propdesk-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.gateway.host, "0.0.0.0");
    assert_eq!(config.gateway.port, 8080);
    assert!(!config.crm.dialogue_enabled);
    assert!(!config.crm.auto_create_leads);
    assert_eq!(config.crm.company_resolution, CompanyResolutionMode::None);
    assert_eq!(config.crm.returning_customer_threshold, 5);
    assert_eq!(config.crm.metadata_history_limit, 20);
    assert_eq!(config.crm.scoring.name, 5);
    assert_eq!(config.crm.scoring.contact, 15);
    assert_eq!(config.crm.scoring.budget, 25);
}

#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "propdesk");
    assert_eq!(config.agent.log_level, "info");
    assert!(config.telegram.bot_token.is_none());
    assert!(config.telegram.webhook_secret.is_none());
    assert!(config.storage.wal_mode);
    assert_eq!(config.gateway.host, "127.0.0.1");
    assert_eq!(config.gateway.port, 3000);
    assert!(config.crm.dialogue_enabled);
    assert!(config.crm.auto_create_leads);
}

#[test]
fn unknown_field_in_crm_gets_suggestion() {
    let toml = r#"
[crm]
auto_create_lead = true
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { key, suggestion, .. }
            if key == "auto_create_lead" && suggestion.as_deref() == Some("auto_create_leads")
    )));
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let toml = r#"
[anthropic]
api_key = "nope"
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn wrong_type_reports_invalid_type() {
    let toml = r#"
[gateway]
port = "eighty"
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject string port");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. } | ConfigError::Other(_)))
    );
}

#[test]
fn validation_runs_after_deserialization() {
    let toml = r#"
[crm]
company_resolution = "fixed"
"#;
    let errors = load_and_validate_str(toml).expect_err("fixed without id is invalid");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("default_company_id"))
    ));
}

#[test]
fn load_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("propdesk.toml");
    std::fs::write(
        &path,
        "[telegram]\nwebhook_secret = \"from-file\"\n\n[gateway]\nport = 9090\n",
    )
    .unwrap();

    let config = load_and_validate_path(&path).expect("file config should load");
    assert_eq!(config.telegram.webhook_secret.as_deref(), Some("from-file"));
    assert_eq!(config.gateway.port, 9090);
}

#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: PropdeskConfig = Figment::new()
        .merge(Serialized::defaults(PropdeskConfig::default()))
        .merge(Toml::file("/nonexistent/path/propdesk.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.agent.name, "propdesk");
}
