// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` and records every reply and
//! callback acknowledgement for assertion in tests. Sends can be switched to
//! fail, and individual file ids can be made unresolvable.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use propdesk_core::{
    AdapterType, ChannelAdapter, HealthStatus, MessageId, OutboundMessage, PluginAdapter,
    PropdeskError,
};

/// Base of the URLs returned by [`ChannelAdapter::resolve_file_url`].
pub const MOCK_FILE_BASE: &str = "https://files.test";

/// A mock Telegram channel for testing.
#[derive(Clone, Default)]
pub struct MockChannel {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    answered: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<bool>>,
    broken_files: Arc<Mutex<HashSet<String>>>,
}

impl MockChannel {
    /// Create a mock channel that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `send` and `answer_callback` fail until switched back.
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }

    /// Make file lookups for `file_id` fail.
    pub async fn fail_file(&self, file_id: &str) {
        self.broken_files.lock().await.insert(file_id.to_string());
    }

    /// Get all messages that were accepted by `send()`.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Get the count of accepted messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// The most recent accepted message, if any.
    pub async fn last_sent(&self) -> Option<OutboundMessage> {
        self.sent.lock().await.last().cloned()
    }

    /// Callback ids acknowledged so far, in order.
    pub async fn answered_callbacks(&self) -> Vec<String> {
        self.answered.lock().await.clone()
    }

    /// Clear recorded messages and acknowledgements.
    pub async fn clear(&self) {
        self.sent.lock().await.clear();
        self.answered.lock().await.clear();
    }

    async fn check_failing(&self, what: &str) -> Result<(), PropdeskError> {
        if *self.failing.lock().await {
            return Err(PropdeskError::Channel {
                message: format!("mock {what} failure"),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, PropdeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PropdeskError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, PropdeskError> {
        self.check_failing("send").await?;
        let id = format!("mock-msg-{}", uuid::Uuid::new_v4());
        self.sent.lock().await.push(msg);
        Ok(MessageId(id))
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), PropdeskError> {
        self.check_failing("answer_callback").await?;
        self.answered.lock().await.push(callback_id.to_string());
        Ok(())
    }

    async fn resolve_file_url(&self, file_id: &str) -> Result<String, PropdeskError> {
        if self.broken_files.lock().await.contains(file_id) {
            return Err(PropdeskError::Channel {
                message: format!("file {file_id} not found"),
                source: None,
            });
        }
        Ok(format!("{MOCK_FILE_BASE}/{file_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(text: &str) -> OutboundMessage {
        OutboundMessage {
            chat_id: "42".to_string(),
            text: text.to_string(),
            keyboard: None,
        }
    }

    #[tokio::test]
    async fn send_captures_outbound_messages() {
        let channel = MockChannel::new();
        let id = channel.send(reply("hello")).await.unwrap();
        assert!(id.0.starts_with("mock-msg-"));

        assert_eq!(channel.sent_count().await, 1);
        assert_eq!(channel.last_sent().await.unwrap().text, "hello");
    }

    #[tokio::test]
    async fn failing_mode_rejects_and_records_nothing() {
        let channel = MockChannel::new();
        channel.set_failing(true).await;
        assert!(channel.send(reply("hello")).await.is_err());
        assert!(channel.answer_callback("cb").await.is_err());
        assert_eq!(channel.sent_count().await, 0);
        assert!(channel.answered_callbacks().await.is_empty());

        channel.set_failing(false).await;
        assert!(channel.send(reply("hello")).await.is_ok());
    }

    #[tokio::test]
    async fn file_lookup_can_be_broken_per_id() {
        let channel = MockChannel::new();
        channel.fail_file("gone").await;
        assert_eq!(
            channel.resolve_file_url("photo-1").await.unwrap(),
            "https://files.test/photo-1"
        );
        assert!(channel.resolve_file_url("gone").await.is_err());
    }

    #[tokio::test]
    async fn clones_share_recordings() {
        let channel = MockChannel::new();
        let handle = channel.clone();
        channel.answer_callback("cb-1").await.unwrap();
        assert_eq!(handle.answered_callbacks().await, vec!["cb-1".to_string()]);
        handle.clear().await;
        assert!(channel.answered_callbacks().await.is_empty());
    }

    #[tokio::test]
    async fn health_check_is_healthy() {
        let channel = MockChannel::new();
        assert_eq!(channel.health_check().await.unwrap(), HealthStatus::Healthy);
        assert_eq!(channel.name(), "mock-channel");
    }
}
