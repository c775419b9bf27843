// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./propdesk.toml` > `~/.config/propdesk/propdesk.toml` >
//! `/etc/propdesk/propdesk.toml`, with `PROPDESK_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PropdeskConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/propdesk/propdesk.toml`
/// 3. `~/.config/propdesk/propdesk.toml`
/// 4. `./propdesk.toml`
/// 5. `PROPDESK_*` environment variables
pub fn load_config() -> Result<PropdeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string over the defaults (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<PropdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PropdeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PropdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PropdeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files in merge order, lowest precedence first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/propdesk/propdesk.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("propdesk").join("propdesk.toml"));
    }
    paths.push(PathBuf::from("propdesk.toml"));
    paths
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    let figment = Figment::new().merge(Serialized::defaults(PropdeskConfig::default()));
    search_paths()
        .into_iter()
        .fold(figment, |figment, path| figment.merge(Toml::file(path)))
        .merge(env_provider())
}

/// Environment provider with an explicit section mapping.
///
/// `Env::split("_")` would turn `PROPDESK_TELEGRAM_BOT_TOKEN` into
/// `telegram.bot.token`; only the first segment names the section.
fn env_provider() -> Env {
    Env::prefixed("PROPDESK_").map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: &[&str] = &["agent", "telegram", "storage", "gateway"];

    if let Some(rest) = key.strip_prefix("crm_scoring_") {
        return format!("crm.scoring.{rest}");
    }
    if let Some(rest) = key.strip_prefix("crm_") {
        return format!("crm.{rest}");
    }
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
