// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for Propdesk.
//!
//! Layered TOML files plus `PROPDESK_*` environment overrides, merged with
//! figment into [`PropdeskConfig`]. Every section denies unknown fields;
//! failures come back as [`ConfigError`] diagnostics that
//! [`render_errors`] prints with miette.
//!
//! ```no_run
//! match propdesk_config::load_and_validate() {
//!     Ok(config) => println!("webhook on {}:{}", config.gateway.host, config.gateway.port),
//!     Err(errors) => propdesk_config::render_errors(&errors),
//! }
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, ConfigSource, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{CompanyResolutionMode, PropdeskConfig};

/// Loads the file hierarchy and environment, then validates.
pub fn load_and_validate() -> Result<PropdeskConfig, Vec<ConfigError>> {
    finish(loader::load_config(), || {
        loader::search_paths()
            .iter()
            .filter_map(|p| ConfigSource::read(p))
            .collect()
    })
}

/// Loads one explicit file (plus environment), then validates.
pub fn load_and_validate_path(path: &Path) -> Result<PropdeskConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        ConfigSource::read(path).into_iter().collect()
    })
}

/// Loads a TOML string over the defaults, then validates.
pub fn load_and_validate_str(toml_content: &str) -> Result<PropdeskConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![ConfigSource::new("<inline>", toml_content)]
    })
}

/// Sources are read only when extraction failed and labels are needed.
fn finish(
    loaded: Result<PropdeskConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<ConfigSource>,
) -> Result<PropdeskConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::from_figment(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}
