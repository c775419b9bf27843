// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::{CompanyResolutionMode, PropdeskConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &PropdeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(format!(
            "agent.log_level `{}` must be one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if let Some(secret) = &config.telegram.webhook_secret
        && secret.trim().is_empty()
    {
        fail("telegram.webhook_secret must not be empty when set".to_string());
    }

    if !config.telegram.api_url.starts_with("http://")
        && !config.telegram.api_url.starts_with("https://")
    {
        fail(format!(
            "telegram.api_url `{}` must start with http:// or https://",
            config.telegram.api_url
        ));
    }

    if config.crm.company_resolution == CompanyResolutionMode::Fixed
        && config
            .crm
            .default_company_id
            .as_deref()
            .is_none_or(|id| id.trim().is_empty())
    {
        fail("crm.default_company_id is required when company_resolution = \"fixed\"".to_string());
    }

    if config.crm.metadata_history_limit == 0 {
        fail("crm.metadata_history_limit must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &PropdeskConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        let config = PropdeskConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = PropdeskConfig::default();
        config.storage.database_path = "".to_string();
        assert!(messages(&config).iter().any(|m| m.contains("database_path")));
    }

    #[test]
    fn fixed_resolution_requires_company_id() {
        let mut config = PropdeskConfig::default();
        config.crm.company_resolution = CompanyResolutionMode::Fixed;
        assert!(
            messages(&config)
                .iter()
                .any(|m| m.contains("default_company_id"))
        );

        config.crm.default_company_id = Some("c-1".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = PropdeskConfig::default();
        config.agent.log_level = "loud".to_string();
        config.gateway.host = "".to_string();
        config.crm.metadata_history_limit = 0;
        config.telegram.webhook_secret = Some("  ".to_string());
        assert_eq!(messages(&config).len(), 4);
    }

    #[test]
    fn bad_api_url_fails_validation() {
        let mut config = PropdeskConfig::default();
        config.telegram.api_url = "api.telegram.org".to_string();
        assert!(messages(&config).iter().any(|m| m.contains("api_url")));
    }
}
