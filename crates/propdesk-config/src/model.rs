// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Propdesk.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Propdesk configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PropdeskConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Dialogue, lead and scoring behavior.
    #[serde(default)]
    pub crm: CrmConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs and the health endpoint.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "propdesk".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables outbound delivery.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Shared secret Telegram echoes in `X-Telegram-Bot-Api-Secret-Token`.
    /// `None` rejects every webhook call.
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Bot API base URL used to build attachment download links.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            webhook_secret: None,
            api_url: default_api_url(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("propdesk").join("propdesk.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("propdesk.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// How a newly seen customer is attached to a company.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyResolutionMode {
    /// Oldest active company by creation time.
    #[default]
    FirstActive,
    /// Always `crm.default_company_id`.
    Fixed,
    /// Leave customers unassigned.
    None,
}

/// Dialogue, lead and scoring configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CrmConfig {
    /// Run the dialogue engine; when off every message gets the keyword auto-reply.
    #[serde(default = "default_true")]
    pub dialogue_enabled: bool,

    /// Create keyword-triggered leads for customers without an active lead.
    #[serde(default = "default_true")]
    pub auto_create_leads: bool,

    #[serde(default)]
    pub company_resolution: CompanyResolutionMode,

    /// Company id used when `company_resolution = "fixed"`.
    #[serde(default)]
    pub default_company_id: Option<String>,

    /// Customers with more than this many prior turns are treated as returning.
    #[serde(default = "default_returning_threshold")]
    pub returning_customer_threshold: u32,

    /// Number of action history entries kept in conversation metadata.
    #[serde(default = "default_metadata_history_limit")]
    pub metadata_history_limit: usize,

    /// Weights for the lead scorer.
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            dialogue_enabled: true,
            auto_create_leads: true,
            company_resolution: CompanyResolutionMode::default(),
            default_company_id: None,
            returning_customer_threshold: default_returning_threshold(),
            metadata_history_limit: default_metadata_history_limit(),
            scoring: ScoringConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_returning_threshold() -> u32 {
    3
}

fn default_metadata_history_limit() -> usize {
    10
}

/// Points awarded per known signal. The total is capped at 100.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    #[serde(default = "default_name_weight")]
    pub name: u8,
    #[serde(default = "default_budget_weight")]
    pub budget: u8,
    #[serde(default = "default_location_weight")]
    pub location: u8,
    #[serde(default = "default_property_type_weight")]
    pub property_type: u8,
    #[serde(default = "default_timeline_weight")]
    pub timeline: u8,
    #[serde(default = "default_financing_weight")]
    pub financing: u8,
    #[serde(default = "default_contact_weight")]
    pub contact: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            name: default_name_weight(),
            budget: default_budget_weight(),
            location: default_location_weight(),
            property_type: default_property_type_weight(),
            timeline: default_timeline_weight(),
            financing: default_financing_weight(),
            contact: default_contact_weight(),
        }
    }
}

fn default_name_weight() -> u8 {
    10
}

fn default_budget_weight() -> u8 {
    25
}

fn default_location_weight() -> u8 {
    20
}

fn default_property_type_weight() -> u8 {
    20
}

fn default_timeline_weight() -> u8 {
    10
}

fn default_financing_weight() -> u8 {
    10
}

fn default_contact_weight() -> u8 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crm_defaults() {
        let crm = CrmConfig::default();
        assert!(crm.dialogue_enabled);
        assert!(crm.auto_create_leads);
        assert_eq!(crm.company_resolution, CompanyResolutionMode::FirstActive);
        assert_eq!(crm.returning_customer_threshold, 3);
        assert_eq!(crm.metadata_history_limit, 10);
    }

    #[test]
    fn company_resolution_parses_snake_case() {
        let toml_str = r#"
[crm]
company_resolution = "fixed"
default_company_id = "c-1"
"#;
        let config: PropdeskConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.crm.company_resolution, CompanyResolutionMode::Fixed);
        assert_eq!(config.crm.default_company_id.as_deref(), Some("c-1"));
    }

    #[test]
    fn partial_scoring_table_keeps_other_defaults() {
        let toml_str = r#"
[crm.scoring]
budget = 40
"#;
        let config: PropdeskConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.crm.scoring.budget, 40);
        assert_eq!(config.crm.scoring.location, 20);
    }

    #[test]
    fn scoring_denies_unknown_fields() {
        let toml_str = r#"
[crm.scoring]
budgte = 40
"#;
        assert!(toml::from_str::<PropdeskConfig>(toml_str).is_err());
    }
}
