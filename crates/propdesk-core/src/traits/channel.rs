// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for outbound messaging (Telegram).

use async_trait::async_trait;

use crate::error::PropdeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MessageId, OutboundMessage};

/// Outbound half of a messaging platform integration.
///
/// Inbound traffic arrives through the webhook, so the channel only sends,
/// acknowledges button presses and resolves attachment ids to URLs.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Sends a reply, with its quick-reply keyboard if present.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, PropdeskError>;

    /// Acknowledges a button press so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<(), PropdeskError>;

    /// Resolves a platform file id to a fetchable URL.
    async fn resolve_file_url(&self, file_id: &str) -> Result<String, PropdeskError>;
}
