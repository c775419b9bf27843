// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Propdesk.

use thiserror::Error;

/// The primary error type used across all Propdesk adapters and pipeline stages.
#[derive(Debug, Error)]
pub enum PropdeskError {
    /// Configuration errors (invalid TOML, missing bot token, bad policy).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging channel errors (send failure, file lookup, bad chat id).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The inbound webhook payload could not be parsed.
    #[error("malformed payload: {message}")]
    Payload {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The dialogue engine could not produce an outcome for the turn.
    #[error("dialogue error: {0}")]
    Dialogue(String),

    /// A record the caller expected to exist was not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PropdeskError {
    /// Wraps any error as a storage error.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PropdeskError::Storage {
            source: Box::new(source),
        }
    }
}
