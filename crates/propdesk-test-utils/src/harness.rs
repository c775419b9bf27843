// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full webhook stack: a temp SQLite database in
//! WAL mode, a [`MockChannel`], the processing [`Pipeline`] and the gateway
//! router. Tests drive it either through the pipeline directly or with HTTP
//! requests against [`TestHarness::router`].

use std::sync::Arc;

use axum::Router;
use propdesk_agent::Pipeline;
use propdesk_config::model::{CrmConfig, StorageConfig};
use propdesk_core::types::PLATFORM_TELEGRAM;
use propdesk_core::{
    CallbackInteraction, ChannelAdapter, Company, Conversation, Customer, InboundMessage,
    InboundUpdate, MessageType, PropdeskError, Sender, StorageAdapter, UpdateHandler,
};
use propdesk_gateway::{GatewayState, build_router};
use propdesk_storage::SqliteStorage;
use serde_json::{Value, json};

use crate::mock_channel::MockChannel;

/// Secret the harness router expects unless overridden.
pub const TEST_WEBHOOK_SECRET: &str = "test-secret";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    crm: CrmConfig,
    webhook_secret: Option<String>,
    companies: Vec<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            crm: CrmConfig::default(),
            webhook_secret: Some(TEST_WEBHOOK_SECRET.to_string()),
            companies: Vec::new(),
        }
    }

    /// Use this `[crm]` section instead of the defaults.
    pub fn with_crm(mut self, crm: CrmConfig) -> Self {
        self.crm = crm;
        self
    }

    /// Set (or with `None`, remove) the webhook secret.
    pub fn with_webhook_secret(mut self, secret: Option<&str>) -> Self {
        self.webhook_secret = secret.map(str::to_string);
        self
    }

    /// Create an active company before the first update.
    pub fn with_company(mut self, name: &str) -> Self {
        self.companies.push(name.to_string());
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, PropdeskError> {
        let temp_dir = tempfile::TempDir::new().map_err(PropdeskError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let mut companies = Vec::with_capacity(self.companies.len());
        for name in &self.companies {
            companies.push(storage.create_company(name).await?);
        }

        let mock_channel = Arc::new(MockChannel::new());
        let channel: Arc<dyn ChannelAdapter> = mock_channel.clone();
        let pipeline = Arc::new(Pipeline::new(storage.clone(), Some(channel), &self.crm));

        Ok(TestHarness {
            mock_channel,
            storage,
            pipeline,
            companies,
            webhook_secret: self.webhook_secret,
            next_update_id: std::sync::atomic::AtomicI64::new(1),
            _temp_dir: temp_dir,
        })
    }
}

/// A fully wired Propdesk stack for end-to-end tests.
pub struct TestHarness {
    pub mock_channel: Arc<MockChannel>,
    pub storage: Arc<dyn StorageAdapter>,
    pub pipeline: Arc<Pipeline>,
    /// Companies created by [`TestHarnessBuilder::with_company`], in order.
    pub companies: Vec<Company>,
    webhook_secret: Option<String>,
    next_update_id: std::sync::atomic::AtomicI64,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Webhook router sharing this harness's pipeline.
    pub fn router(&self) -> Router {
        let handler: Arc<dyn UpdateHandler> = self.pipeline.clone();
        build_router(GatewayState::new(handler, self.webhook_secret.clone()))
    }

    /// Process a text message from Telegram user `user_id` in their private
    /// chat.
    pub async fn send_text(&self, user_id: i64, text: &str) -> Result<(), PropdeskError> {
        let update = InboundUpdate::Message(InboundMessage {
            platform: PLATFORM_TELEGRAM.to_string(),
            platform_message_id: self.next_id().to_string(),
            chat_id: user_id.to_string(),
            sender: test_sender(user_id),
            content: text.to_string(),
            message_type: MessageType::Text,
            attachments: Vec::new(),
            platform_metadata: json!({ "chat_id": user_id.to_string() }),
        });
        self.pipeline.handle(update).await
    }

    /// Process a button press with callback `data`.
    pub async fn press_button(&self, user_id: i64, data: &str) -> Result<(), PropdeskError> {
        let update = InboundUpdate::Callback(CallbackInteraction {
            platform: PLATFORM_TELEGRAM.to_string(),
            callback_id: format!("cb-{}", self.next_id()),
            chat_id: user_id.to_string(),
            sender: test_sender(user_id),
            data: data.to_string(),
        });
        self.pipeline.handle(update).await
    }

    /// The stored customer for `user_id`, if any.
    pub async fn customer(&self, user_id: i64) -> Result<Option<Customer>, PropdeskError> {
        self.storage
            .get_customer_by_external(PLATFORM_TELEGRAM, &user_id.to_string())
            .await
    }

    /// The private-chat conversation for `user_id`, if any.
    pub async fn conversation(&self, user_id: i64) -> Result<Option<Conversation>, PropdeskError> {
        let Some(customer) = self.customer(user_id).await? else {
            return Ok(None);
        };
        let chat_id = user_id.to_string();
        Ok(self
            .storage
            .list_conversations_for_customer(&customer.id)
            .await?
            .into_iter()
            .find(|c| c.platform_conversation_id == chat_id))
    }

    fn next_id(&self) -> i64 {
        self.next_update_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    }
}

fn test_sender(user_id: i64) -> Sender {
    Sender {
        external_id: user_id.to_string(),
        display_name: "Test Customer".to_string(),
        username: Some(format!("user{user_id}")),
    }
}

/// Raw Telegram webhook body for a private text message.
pub fn text_update_json(update_id: i64, user_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "date": 1_700_000_000,
            "chat": { "id": user_id, "type": "private" },
            "from": { "id": user_id, "is_bot": false, "first_name": "Test", "last_name": "Customer" },
            "text": text,
        }
    })
}

/// Raw Telegram webhook body for an inline button press.
pub fn callback_update_json(update_id: i64, user_id: i64, data: &str) -> Value {
    json!({
        "update_id": update_id,
        "callback_query": {
            "id": format!("cb-{update_id}"),
            "from": { "id": user_id, "is_bot": false, "first_name": "Test" },
            "message": {
                "message_id": update_id,
                "date": 1_700_000_000,
                "chat": { "id": user_id, "type": "private" },
                "text": "Choose an option",
            },
            "chat_instance": format!("ci-{user_id}"),
            "data": data,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_processes_text() {
        let harness = TestHarness::builder().build().await.unwrap();
        harness.send_text(100, "hello").await.unwrap();

        assert_eq!(harness.mock_channel.sent_count().await, 1);
        let conversation = harness.conversation(100).await.unwrap().unwrap();
        let messages = harness
            .storage
            .get_messages(&conversation.id, None)
            .await
            .unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[tokio::test]
    async fn builder_creates_companies() {
        let harness = TestHarness::builder()
            .with_company("Acme Realty")
            .build()
            .await
            .unwrap();
        harness.send_text(7, "hi").await.unwrap();

        let customer = harness.customer(7).await.unwrap().unwrap();
        assert_eq!(customer.company_id, Some(harness.companies[0].id.clone()));
    }

    #[test]
    fn update_json_parses() {
        let text = text_update_json(1, 9, "hello");
        assert_eq!(text["message"]["chat"]["id"], 9);
        let cb = callback_update_json(2, 9, "show_properties");
        assert_eq!(cb["callback_query"]["data"], "show_properties");
    }
}
