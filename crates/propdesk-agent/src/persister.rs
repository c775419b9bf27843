// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message persistence.
//!
//! Every inbound message, button press and outbound reply becomes one
//! immutable row. Edits are stored as new rows with `is_edited = true`.

use std::sync::Arc;

use propdesk_core::types::NewMessage;
use propdesk_core::{
    CallbackInteraction, ChannelAdapter, DeliveryStatus, InboundMessage, Message, MessageType,
    PropdeskError, SenderRole, StorageAdapter,
};
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Writes conversation messages to storage.
pub struct Persister {
    storage: Arc<dyn StorageAdapter>,
    channel: Option<Arc<dyn ChannelAdapter>>,
}

impl Persister {
    pub fn new(storage: Arc<dyn StorageAdapter>, channel: Option<Arc<dyn ChannelAdapter>>) -> Self {
        Self { storage, channel }
    }

    /// Stores an inbound customer message.
    ///
    /// Attachments are resolved to download URLs one at a time; a lookup that
    /// fails is logged and left out of `media_urls`.
    pub async fn save_message(
        &self,
        conversation_id: &str,
        message: &InboundMessage,
        is_edit: bool,
    ) -> Result<Message, PropdeskError> {
        let media_urls = self.resolve_media(message).await;

        let mut metadata = match &message.platform_metadata {
            Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        metadata.insert("is_edited".to_string(), Value::Bool(is_edit));

        let stored = self
            .storage
            .insert_message(NewMessage {
                conversation_id: conversation_id.to_string(),
                sender: SenderRole::Customer,
                content: message.content.clone(),
                message_type: message.message_type,
                media_urls,
                status: DeliveryStatus::Received,
                platform_message_id: Some(message.platform_message_id.clone()),
                metadata: Value::Object(metadata),
            })
            .await?;
        debug!(
            message_id = %stored.id,
            conversation_id,
            message_type = %stored.message_type,
            is_edit,
            "inbound message stored"
        );
        Ok(stored)
    }

    /// Stores a button press as a customer message labelled the way the
    /// customer saw the button.
    pub async fn save_button_press(
        &self,
        conversation_id: &str,
        interaction: &CallbackInteraction,
        label: &str,
    ) -> Result<Message, PropdeskError> {
        self.storage
            .insert_message(NewMessage {
                conversation_id: conversation_id.to_string(),
                sender: SenderRole::Customer,
                content: label.to_string(),
                message_type: MessageType::Text,
                media_urls: Vec::new(),
                status: DeliveryStatus::Received,
                platform_message_id: None,
                metadata: json!({
                    "callback_data": interaction.data,
                    "callback_id": interaction.callback_id,
                    "is_edited": false,
                }),
            })
            .await
    }

    /// Stores the outbound reply with its delivery result.
    pub async fn save_reply(
        &self,
        conversation_id: &str,
        text: &str,
        delivered: bool,
    ) -> Result<Message, PropdeskError> {
        let status = if delivered {
            DeliveryStatus::Sent
        } else {
            DeliveryStatus::Failed
        };
        self.storage
            .insert_message(NewMessage {
                conversation_id: conversation_id.to_string(),
                sender: SenderRole::System,
                content: text.to_string(),
                message_type: MessageType::Text,
                media_urls: Vec::new(),
                status,
                platform_message_id: None,
                metadata: json!({}),
            })
            .await
    }

    async fn resolve_media(&self, message: &InboundMessage) -> Vec<String> {
        if message.attachments.is_empty() {
            return Vec::new();
        }
        let Some(channel) = &self.channel else {
            warn!(
                count = message.attachments.len(),
                "no channel configured, attachments left unresolved"
            );
            return Vec::new();
        };

        let mut urls = Vec::with_capacity(message.attachments.len());
        for attachment in &message.attachments {
            match channel.resolve_file_url(&attachment.file_id).await {
                Ok(url) => urls.push(url),
                Err(e) => warn!(
                    file_id = %attachment.file_id,
                    error = %e,
                    "failed to resolve attachment, skipping"
                ),
            }
        }
        urls
    }
}
