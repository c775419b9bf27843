// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound delivery. Failures are logged and never fail the turn.

use std::sync::Arc;

use propdesk_core::{ChannelAdapter, OutboundMessage, QuickReplies};
use tracing::{debug, warn};

/// Sends replies and callback acknowledgements through the channel.
pub struct ReplySender {
    channel: Option<Arc<dyn ChannelAdapter>>,
}

impl ReplySender {
    pub fn new(channel: Option<Arc<dyn ChannelAdapter>>) -> Self {
        Self { channel }
    }

    /// Sends `text` to `chat_id`. Returns whether the channel accepted it.
    pub async fn send_reply(
        &self,
        chat_id: &str,
        text: &str,
        keyboard: Option<QuickReplies>,
    ) -> bool {
        let Some(channel) = &self.channel else {
            warn!(chat_id, "no channel configured, reply not delivered");
            return false;
        };
        let msg = OutboundMessage {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            keyboard,
        };
        match channel.send(msg).await {
            Ok(id) => {
                debug!(chat_id, message_id = %id.0, "reply delivered");
                true
            }
            Err(e) => {
                warn!(chat_id, error = %e, "failed to deliver reply");
                false
            }
        }
    }

    /// Stops the client-side spinner on a pressed button.
    pub async fn acknowledge(&self, callback_id: &str) {
        let Some(channel) = &self.channel else {
            return;
        };
        if let Err(e) = channel.answer_callback(callback_id).await {
            warn!(callback_id, error = %e, "failed to answer callback");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propdesk_core::QuickReply;
    use propdesk_test_utils::MockChannel;

    #[tokio::test]
    async fn delivered_reply_carries_keyboard() {
        let channel = Arc::new(MockChannel::new());
        let sender = ReplySender::new(Some(channel.clone()));
        let keyboard = QuickReplies {
            rows: vec![vec![QuickReply::new("Villa", "property_villa")]],
        };

        assert!(sender.send_reply("42", "Pick one", Some(keyboard.clone())).await);
        let sent = channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, "42");
        assert_eq!(sent[0].keyboard, Some(keyboard));
    }

    #[tokio::test]
    async fn send_failure_is_swallowed() {
        let channel = Arc::new(MockChannel::new());
        channel.set_failing(true).await;
        let sender = ReplySender::new(Some(channel.clone()));

        assert!(!sender.send_reply("42", "Hello", None).await);
        sender.acknowledge("cb-1").await;
        assert_eq!(channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn missing_channel_reports_undelivered() {
        let sender = ReplySender::new(None);
        assert!(!sender.send_reply("42", "Hello", None).await);
        sender.acknowledge("cb-1").await;
    }

    #[tokio::test]
    async fn acknowledge_records_callback() {
        let channel = Arc::new(MockChannel::new());
        let sender = ReplySender::new(Some(channel.clone()));
        sender.acknowledge("cb-7").await;
        assert_eq!(channel.answered_callbacks().await, vec!["cb-7".to_string()]);
    }
}
