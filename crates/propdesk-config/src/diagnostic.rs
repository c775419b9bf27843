// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config error diagnostics.
//!
//! [`from_figment`] turns a figment extraction failure into [`ConfigError`]s
//! that miette can render. Unknown keys carry a "did you mean" suggestion
//! (Jaro-Winkler via `strsim`) and, when the file that introduced them is
//! known, a label on the offending line.

// The Diagnostic derive assigns fields it never reads back.
#![allow(unused_assignments)]

use std::ops::Range;
use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Below this Jaro-Winkler similarity no key is suggested.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A config file's path and text, kept so diagnostics can quote it.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: String,
    pub content: String,
}

impl ConfigSource {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Reads `path`. Missing or unreadable files yield `None`.
    ///
    /// The stored path is absolute so it matches figment's metadata.
    pub fn read(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        Some(Self::new(path.display().to_string(), content))
    }
}

/// A configuration problem, rendered by miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {table}")]
    #[diagnostic(code(propdesk::config::unknown_key))]
    UnknownKey {
        key: String,
        /// `[section]`, or `the top level`.
        table: String,
        suggestion: Option<String>,
        #[help]
        help: Option<String>,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(propdesk::config::invalid_type), help("`{key}` expects {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(code(propdesk::config::missing_key))]
    MissingKey { key: String },

    /// The config deserialized but a value is unusable.
    #[error("validation error: {message}")]
    #[diagnostic(code(propdesk::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(propdesk::config::other))]
    Other(String),
}

/// Converts every error figment collected into a [`ConfigError`].
///
/// `sources` are the files that were merged; they are only used to attach
/// source labels.
pub fn from_figment(err: figment::Error, sources: &[ConfigSource]) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let table = error.path.join(".");
            match &error.kind {
                Kind::UnknownField(key, expected) => {
                    let origin = error.metadata.as_ref().and_then(|m| match &m.source {
                        Some(figment::Source::File(path)) => Some(path.display().to_string()),
                        _ => None,
                    });
                    unknown_key(key, &table, expected, pick_source(sources, origin.as_deref()))
                }
                Kind::MissingField(key) => ConfigError::MissingKey {
                    key: qualified(&table, key),
                },
                Kind::InvalidType(found, expected) => ConfigError::InvalidType {
                    key: table,
                    found: found.to_string(),
                    expected: expected.clone(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn unknown_key(
    key: &str,
    table: &str,
    expected: &[&str],
    source: Option<&ConfigSource>,
) -> ConfigError {
    let suggestion = suggest_key(key, expected);
    let valid = expected.join(", ");
    let help = match &suggestion {
        Some(s) => format!("did you mean `{s}`? valid keys: {valid}"),
        None => format!("valid keys: {valid}"),
    };

    let located = source.and_then(|s| locate_key(&s.content, table, key).map(|r| (s, r)));
    let (span, src) = match located {
        Some((s, range)) => (
            Some(SourceSpan::from(range)),
            Some(NamedSource::new(&s.path, s.content.clone())),
        ),
        None => (None, None),
    };

    ConfigError::UnknownKey {
        key: key.to_string(),
        table: if table.is_empty() {
            "the top level".to_string()
        } else {
            format!("[{table}]")
        },
        suggestion,
        help: Some(help),
        span,
        src,
    }
}

/// The file an error came from, or the only source when there is just one.
fn pick_source<'a>(sources: &'a [ConfigSource], origin: Option<&str>) -> Option<&'a ConfigSource> {
    match origin {
        Some(path) => sources.iter().find(|s| s.path == path),
        None if sources.len() == 1 => sources.first(),
        None => None,
    }
}

fn qualified(table: &str, key: &str) -> String {
    if table.is_empty() {
        key.to_string()
    } else {
        format!("{table}.{key}")
    }
}

/// Byte range of `key` inside the TOML table `table` (dotted, e.g.
/// `crm.scoring`). An empty `table` means the top level, which ends at the
/// first header.
pub fn locate_key(content: &str, table: &str, key: &str) -> Option<Range<usize>> {
    let mut in_table = table.is_empty();
    let mut line_start = 0;

    for line in content.split_inclusive('\n') {
        let start = line_start;
        line_start += line.len();

        let body = line.trim_start();
        if let Some(header) = body.strip_prefix('[') {
            let name = header.trim_start_matches('[').split(']').next().unwrap_or("");
            in_table = name.trim() == table;
            continue;
        }
        if !in_table {
            continue;
        }
        if let Some(rest) = body.strip_prefix(key)
            && rest.trim_start().starts_with('=')
        {
            let begin = start + (line.len() - body.len());
            return Some(begin..begin + key.len());
        }
    }
    None
}

/// The closest valid key to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|c| (strsim::jaro_winkler(unknown, c), *c))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| c.to_string())
}

/// Prints each error to stderr with miette's graphical renderer.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_keys_only() {
        let telegram = &["bot_token", "webhook_secret", "api_url"];
        assert_eq!(
            suggest_key("webhook_secert", telegram),
            Some("webhook_secret".to_string())
        );
        assert_eq!(suggest_key("zzzzzz", &["name", "log_level"]), None);
    }

    #[test]
    fn locate_key_respects_tables() {
        let content = "name = \"top\"\n[agent]\nname = \"a\"\n\n[crm.scoring]\n  name = 5\n";
        let top = locate_key(content, "", "name").unwrap();
        assert_eq!(top, 0..4);

        let agent = locate_key(content, "agent", "name").unwrap();
        assert_eq!(&content[agent.clone()], "name");
        assert!(agent.start > top.start);

        let scoring = locate_key(content, "crm.scoring", "name").unwrap();
        assert_eq!(&content[scoring.clone()], "name");
        assert!(scoring.start > agent.start);

        assert_eq!(locate_key(content, "gateway", "port"), None);
    }

    #[test]
    fn locate_key_needs_an_assignment() {
        let content = "[crm]\nscoring_notes = 1\nscoring = 2\n";
        let range = locate_key(content, "crm", "scoring").unwrap();
        assert_eq!(&content[range.start..range.start + 11], "scoring = 2");
    }

    #[test]
    fn unknown_key_points_into_single_source() {
        let toml = "[crm]\ndialog_enabled = true\n";
        let err = crate::loader::load_config_from_str(toml).unwrap_err();
        let errors = from_figment(err, &[ConfigSource::new("<inline>", toml)]);

        match &errors[0] {
            ConfigError::UnknownKey {
                key,
                table,
                suggestion,
                span,
                ..
            } => {
                assert_eq!(key, "dialog_enabled");
                assert_eq!(table, "[crm]");
                assert_eq!(suggestion.as_deref(), Some("dialogue_enabled"));
                let span = span.as_ref().expect("span should be located");
                assert_eq!(span.offset(), 6);
                assert_eq!(span.len(), "dialog_enabled".len());
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
    }

    #[test]
    fn unknown_key_without_source_has_no_span() {
        let err = crate::loader::load_config_from_str("[agent]\nnmae = \"x\"\n").unwrap_err();
        let errors = from_figment(err, &[]);
        assert!(matches!(
            &errors[0],
            ConfigError::UnknownKey { span: None, src: None, .. }
        ));
        assert!(errors[0].to_string().contains("[agent]"));
    }
}
