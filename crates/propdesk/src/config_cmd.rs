// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `propdesk config` command implementation.

use propdesk_config::model::PropdeskConfig;
use propdesk_core::PropdeskError;

const REDACTED: &str = "[redacted]";

/// Renders the effective configuration as TOML with secrets masked.
pub fn render(config: &PropdeskConfig) -> Result<String, PropdeskError> {
    let mut shown = config.clone();
    if shown.telegram.bot_token.is_some() {
        shown.telegram.bot_token = Some(REDACTED.to_string());
    }
    if shown.telegram.webhook_secret.is_some() {
        shown.telegram.webhook_secret = Some(REDACTED.to_string());
    }
    toml::to_string_pretty(&shown)
        .map_err(|e| PropdeskError::Internal(format!("failed to render config: {e}")))
}

/// Prints the effective configuration.
pub fn run_show(config: &PropdeskConfig) -> Result<(), PropdeskError> {
    print!("{}", render(config)?);
    Ok(())
}

/// Reports a configuration that loaded and validated.
pub fn run_validate(config: &PropdeskConfig) {
    println!(
        "propdesk: configuration is valid (agent.name={}, gateway={}:{})",
        config.agent.name, config.gateway.host, config.gateway.port
    );
}
