// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound processing pipeline for Propdesk.
//!
//! The [`Pipeline`] is the [`UpdateHandler`](propdesk_core::UpdateHandler)
//! behind the webhook. For every update it:
//! - Resolves the customer and conversation
//! - Persists the inbound message or button press
//! - Runs the dialogue engine against the persisted dialogue state
//! - Records leads, the customer profile and CRM action history
//! - Sends the reply and stores it with its delivery status

pub mod persister;
pub mod pipeline;
pub mod recorder;
pub mod resolver;
pub mod sender;
pub mod shutdown;

pub use persister::Persister;
pub use pipeline::Pipeline;
pub use recorder::Recorder;
pub use resolver::{CompanyResolution, Resolver};
pub use sender::ReplySender;
pub use shutdown::install_signal_handler;

/// Current UTC time in the storage timestamp format.
pub(crate) fn now() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}
