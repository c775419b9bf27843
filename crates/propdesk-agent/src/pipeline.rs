// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-update processing pipeline.
//!
//! resolve customer and conversation -> persist input -> dialogue ->
//! record leads and actions -> send and store the reply.

use std::sync::Arc;

use async_trait::async_trait;
use propdesk_config::model::CrmConfig;
use propdesk_core::{
    CallbackInteraction, ChannelAdapter, Conversation, Customer, InboundMessage, InboundUpdate,
    PropdeskError, QuickReplies, SenderRole, StorageAdapter, UpdateHandler,
};
use propdesk_dialogue::{
    ButtonPayload, DialogueEngine, DialogueInput, DialogueOutcome, DialogueState, fallback_reply,
};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::persister::Persister;
use crate::recorder::Recorder;
use crate::resolver::{CompanyResolution, Resolver};
use crate::sender::ReplySender;

/// Customer messages fed to the behavioral insights.
const RECENT_WINDOW: usize = 10;

/// Processes webhook updates end to end.
pub struct Pipeline {
    storage: Arc<dyn StorageAdapter>,
    resolver: Resolver,
    persister: Persister,
    recorder: Recorder,
    sender: ReplySender,
    engine: DialogueEngine,
    dialogue_enabled: bool,
}

/// One customer input on a resolved conversation.
struct Turn<'a> {
    customer: &'a Customer,
    conversation: &'a Conversation,
    chat_id: &'a str,
    input: DialogueInput,
}

impl Pipeline {
    /// Builds the pipeline. Without a channel, replies are stored as failed
    /// and attachments are not resolved.
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        channel: Option<Arc<dyn ChannelAdapter>>,
        crm: &CrmConfig,
    ) -> Self {
        Self {
            resolver: Resolver::new(storage.clone(), CompanyResolution::from_config(crm)),
            persister: Persister::new(storage.clone(), channel.clone()),
            recorder: Recorder::new(storage.clone(), crm),
            sender: ReplySender::new(channel),
            engine: DialogueEngine::new(crm),
            dialogue_enabled: crm.dialogue_enabled,
            storage,
        }
    }

    /// Replace the dialogue engine, e.g. to plug in another lead scorer.
    pub fn with_engine(mut self, engine: DialogueEngine) -> Self {
        self.engine = engine;
        self
    }

    async fn process(&self, update: InboundUpdate) -> Result<(), PropdeskError> {
        match update {
            InboundUpdate::Message(msg) => self.handle_message(msg).await,
            InboundUpdate::EditedMessage(msg) => self.handle_edit(msg).await,
            InboundUpdate::Callback(cb) => self.handle_callback(cb).await,
            InboundUpdate::Unsupported { update_id } => {
                debug!(update_id, "ignoring unsupported update");
                Ok(())
            }
        }
    }

    async fn handle_message(&self, msg: InboundMessage) -> Result<(), PropdeskError> {
        let customer = self
            .resolver
            .find_or_create_customer(&msg.platform, &msg.sender)
            .await?;
        let conversation = self
            .resolver
            .find_or_create_conversation(&customer.id, &msg.platform, &msg.chat_id)
            .await?;
        self.persister
            .save_message(&conversation.id, &msg, false)
            .await?;

        self.respond(Turn {
            customer: &customer,
            conversation: &conversation,
            chat_id: &msg.chat_id,
            input: DialogueInput::Text(msg.content.clone()),
        })
        .await
    }

    /// Edits are recorded but do not advance the dialogue.
    async fn handle_edit(&self, msg: InboundMessage) -> Result<(), PropdeskError> {
        let customer = self
            .resolver
            .find_or_create_customer(&msg.platform, &msg.sender)
            .await?;
        let conversation = self
            .resolver
            .find_or_create_conversation(&customer.id, &msg.platform, &msg.chat_id)
            .await?;
        self.persister
            .save_message(&conversation.id, &msg, true)
            .await?;
        debug!(conversation_id = %conversation.id, "edited message stored");
        Ok(())
    }

    async fn handle_callback(&self, cb: CallbackInteraction) -> Result<(), PropdeskError> {
        self.sender.acknowledge(&cb.callback_id).await;

        let customer = self
            .resolver
            .find_or_create_customer(&cb.platform, &cb.sender)
            .await?;
        let conversation = self
            .resolver
            .find_or_create_conversation(&customer.id, &cb.platform, &cb.chat_id)
            .await?;

        let payload = ButtonPayload::parse(&cb.data);
        let label = payload.label();
        self.persister
            .save_button_press(&conversation.id, &cb, &label)
            .await?;

        self.respond(Turn {
            customer: &customer,
            conversation: &conversation,
            chat_id: &cb.chat_id,
            input: DialogueInput::Button(payload),
        })
        .await
    }

    async fn respond(&self, turn: Turn<'_>) -> Result<(), PropdeskError> {
        if !self.dialogue_enabled {
            return self.respond_with_fallback(&turn).await;
        }

        let outcome = match self.run_dialogue(&turn).await? {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    conversation_id = %turn.conversation.id,
                    error = %e,
                    "dialogue failed, using fallback reply"
                );
                return self.respond_with_fallback(&turn).await;
            }
        };

        if outcome.should_create_lead {
            self.recorder
                .create_enhanced_lead(turn.customer, &outcome)
                .await?;
        }
        if let DialogueInput::Text(text) = &turn.input {
            let requirements = serde_json::to_value(&outcome.context.preferences)
                .unwrap_or_else(|_| json!({}));
            self.recorder
                .create_lead_if_needed(turn.customer, text, outcome.lead_score, requirements)
                .await?;
        }
        self.recorder
            .update_customer_profile(turn.customer, &outcome)
            .await?;
        self.recorder
            .track_crm_actions(turn.conversation, &outcome, &crate::now())
            .await?;
        self.recorder
            .track_sales_funnel_progression(turn.customer, turn.conversation, &outcome);

        self.deliver(&turn, &outcome.reply, outcome.keyboard.clone())
            .await
    }

    /// Loads state, runs the engine and saves the next state.
    ///
    /// The outer `Result` carries storage failures, which abandon the turn.
    /// The inner one carries dialogue failures, which fall back to the
    /// keyword reply.
    async fn run_dialogue(
        &self,
        turn: &Turn<'_>,
    ) -> Result<Result<DialogueOutcome, PropdeskError>, PropdeskError> {
        let conversation_id = &turn.conversation.id;
        let state = match self.storage.get_dialogue_state(conversation_id).await? {
            Some(record) => match DialogueState::from_record(&record) {
                Ok(state) => state,
                Err(e) => return Ok(Err(e)),
            },
            None => {
                let history = self.customer_inputs(conversation_id).await?;
                // The current input is already stored; replay only what came before.
                let prior = &history[..history.len().saturating_sub(1)];
                debug!(conversation_id = %conversation_id, turns = prior.len(), "replaying dialogue history");
                match self.engine.replay(prior, turn.customer) {
                    Ok(state) => state,
                    Err(e) => return Ok(Err(e)),
                }
            }
        };

        let recent = self
            .customer_texts(conversation_id, Some(RECENT_WINDOW))
            .await?;
        let (outcome, next) =
            match self
                .engine
                .process(state, &turn.input, turn.customer, &recent)
            {
                Ok(result) => result,
                Err(e) => return Ok(Err(e)),
            };

        let record = match next.to_record(conversation_id, &crate::now()) {
            Ok(record) => record,
            Err(e) => return Ok(Err(e)),
        };
        self.storage.save_dialogue_state(&record).await?;

        info!(
            conversation_id = %conversation_id,
            stage = %outcome.stage,
            confidence = outcome.confidence,
            actions = ?outcome.actions,
            "dialogue turn processed"
        );
        Ok(Ok(outcome))
    }

    async fn respond_with_fallback(&self, turn: &Turn<'_>) -> Result<(), PropdeskError> {
        let text = turn.input.history_text();
        if let DialogueInput::Text(message) = &turn.input {
            self.recorder
                .create_lead_if_needed(
                    turn.customer,
                    message,
                    turn.customer.lead_score,
                    turn.customer.preferences.clone(),
                )
                .await?;
        }
        let reply = fallback_reply(&text);
        self.deliver(turn, &reply, None).await
    }

    async fn deliver(
        &self,
        turn: &Turn<'_>,
        text: &str,
        keyboard: Option<QuickReplies>,
    ) -> Result<(), PropdeskError> {
        let delivered = self.sender.send_reply(turn.chat_id, text, keyboard).await;
        self.persister
            .save_reply(&turn.conversation.id, text, delivered)
            .await?;
        Ok(())
    }

    /// Every customer input of the conversation, oldest first. Button presses
    /// come back as buttons from their stored `callback_data`.
    async fn customer_inputs(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<DialogueInput>, PropdeskError> {
        Ok(self
            .storage
            .get_messages(conversation_id, None)
            .await?
            .into_iter()
            .filter(|m| m.sender == SenderRole::Customer)
            .map(|m| {
                let data = m.metadata.get("callback_data").and_then(|v| v.as_str());
                DialogueInput::from_stored(&m.content, data)
            })
            .collect())
    }

    /// Customer message contents, oldest first. `limit` keeps the newest
    /// messages of the conversation before filtering by sender.
    async fn customer_texts(
        &self,
        conversation_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<String>, PropdeskError> {
        let limit = limit.map(|l| l * 2);
        Ok(self
            .storage
            .get_messages(conversation_id, limit)
            .await?
            .into_iter()
            .filter(|m| m.sender == SenderRole::Customer)
            .map(|m| m.content)
            .collect())
    }
}

fn update_kind(update: &InboundUpdate) -> &'static str {
    match update {
        InboundUpdate::Message(_) => "message",
        InboundUpdate::EditedMessage(_) => "edited_message",
        InboundUpdate::Callback(_) => "callback_query",
        InboundUpdate::Unsupported { .. } => "unsupported",
    }
}

#[async_trait]
impl UpdateHandler for Pipeline {
    /// Turn failures are logged and swallowed so the platform does not retry.
    async fn handle(&self, update: InboundUpdate) -> Result<(), PropdeskError> {
        let kind = update_kind(&update);
        if let Err(e) = self.process(update).await {
            error!(kind, error = %e, "turn abandoned");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propdesk_core::types::PLATFORM_TELEGRAM;
    use propdesk_core::{DeliveryStatus, MessageType, Sender};
    use propdesk_storage::{Database, SqliteStorage};
    use propdesk_test_utils::MockChannel;

    struct Fixture {
        storage: Arc<dyn StorageAdapter>,
        channel: Arc<MockChannel>,
        pipeline: Pipeline,
    }

    async fn fixture(crm: CrmConfig) -> Fixture {
        let db = Database::open_in_memory().await.unwrap();
        let storage: Arc<dyn StorageAdapter> = Arc::new(SqliteStorage::from_database(db));
        let channel = Arc::new(MockChannel::new());
        let pipeline = Pipeline::new(storage.clone(), Some(channel.clone()), &crm);
        Fixture {
            storage,
            channel,
            pipeline,
        }
    }

    fn sender() -> Sender {
        Sender {
            external_id: "42".into(),
            display_name: "Asha".into(),
            username: None,
        }
    }

    fn text(content: &str) -> InboundUpdate {
        InboundUpdate::Message(InboundMessage {
            platform: PLATFORM_TELEGRAM.into(),
            platform_message_id: "1".into(),
            chat_id: "42".into(),
            sender: sender(),
            content: content.into(),
            message_type: MessageType::Text,
            attachments: vec![],
            platform_metadata: json!({}),
        })
    }

    fn button(data: &str) -> InboundUpdate {
        InboundUpdate::Callback(CallbackInteraction {
            platform: PLATFORM_TELEGRAM.into(),
            callback_id: "cb-1".into(),
            chat_id: "42".into(),
            sender: sender(),
            data: data.into(),
        })
    }

    async fn conversation(f: &Fixture) -> Conversation {
        let customer = f
            .storage
            .get_customer_by_external(PLATFORM_TELEGRAM, "42")
            .await
            .unwrap()
            .unwrap();
        f.storage
            .list_conversations_for_customer(&customer.id)
            .await
            .unwrap()
            .remove(0)
    }

    #[tokio::test]
    async fn message_turn_persists_and_replies() {
        let f = fixture(CrmConfig::default()).await;
        f.pipeline.handle(text("hello")).await.unwrap();

        let sent = f.channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, "42");

        let conv = conversation(&f).await;
        let messages = f.storage.get_messages(&conv.id, None).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, SenderRole::Customer);
        assert_eq!(messages[1].sender, SenderRole::System);
        assert_eq!(messages[1].status, DeliveryStatus::Sent);

        let state = f.storage.get_dialogue_state(&conv.id).await.unwrap().unwrap();
        assert_eq!(state.stage, "name_collection");
        assert_eq!(state.customer_turns, 1);
        assert_eq!(conv.metadata["last_stage"], "name_collection");
    }

    #[tokio::test]
    async fn callback_is_acknowledged_and_stored_by_label() {
        let f = fixture(CrmConfig::default()).await;
        f.pipeline.handle(button("budget_50_100")).await.unwrap();

        assert_eq!(f.channel.answered_callbacks().await, vec!["cb-1".to_string()]);
        let conv = conversation(&f).await;
        let messages = f.storage.get_messages(&conv.id, None).await.unwrap();
        assert_eq!(messages[0].content, "₹50L - ₹1Cr");
        assert_eq!(messages[0].metadata["callback_data"], "budget_50_100");

        let state = f.storage.get_dialogue_state(&conv.id).await.unwrap().unwrap();
        assert_eq!(state.stage, "location_collection");
    }

    #[tokio::test]
    async fn send_failure_still_completes_turn() {
        let f = fixture(CrmConfig::default()).await;
        f.channel.set_failing(true).await;
        f.pipeline.handle(text("hello")).await.unwrap();

        let conv = conversation(&f).await;
        let messages = f.storage.get_messages(&conv.id, None).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].status, DeliveryStatus::Failed);
    }

    #[tokio::test]
    async fn disabled_dialogue_uses_keyword_reply() {
        let f = fixture(CrmConfig {
            dialogue_enabled: false,
            ..CrmConfig::default()
        })
        .await;
        f.pipeline
            .handle(text("I want to buy an apartment"))
            .await
            .unwrap();

        let sent = f.channel.sent_messages().await;
        assert_eq!(sent[0].text, fallback_reply("I want to buy an apartment"));
        assert!(sent[0].keyboard.is_none());

        let conv = conversation(&f).await;
        assert!(f.storage.get_dialogue_state(&conv.id).await.unwrap().is_none());
        let leads = f
            .storage
            .list_leads_for_customer(&conv.customer_id)
            .await
            .unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].source, "keyword");
    }

    #[tokio::test]
    async fn corrupt_state_falls_back() {
        let f = fixture(CrmConfig::default()).await;
        f.pipeline.handle(text("hello")).await.unwrap();
        let conv = conversation(&f).await;

        let mut record = f.storage.get_dialogue_state(&conv.id).await.unwrap().unwrap();
        record.stage = "negotiating_wildly".into();
        f.storage.save_dialogue_state(&record).await.unwrap();

        f.pipeline.handle(text("tell me about loans")).await.unwrap();
        let sent = f.channel.sent_messages().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].text, fallback_reply("tell me about loans"));
    }

    #[tokio::test]
    async fn missing_state_is_rebuilt_from_history() {
        let f = fixture(CrmConfig::default()).await;
        let customer = f
            .storage
            .upsert_customer(propdesk_core::types::NewCustomer {
                platform: PLATFORM_TELEGRAM.into(),
                external_id: "42".into(),
                display_name: "Asha".into(),
                contact_handle: None,
                company_id: None,
            })
            .await
            .unwrap();
        let conv = f
            .storage
            .upsert_conversation(&customer.id, PLATFORM_TELEGRAM, "42")
            .await
            .unwrap();
        for content in ["hi", "3bhk villa please", "budget 50 lakh"] {
            f.storage
                .insert_message(propdesk_core::types::NewMessage {
                    conversation_id: conv.id.clone(),
                    sender: SenderRole::Customer,
                    content: content.into(),
                    message_type: MessageType::Text,
                    media_urls: vec![],
                    status: DeliveryStatus::Received,
                    platform_message_id: None,
                    metadata: json!({}),
                })
                .await
                .unwrap();
        }

        f.pipeline.handle(text("somewhere in whitefield")).await.unwrap();

        let state = f.storage.get_dialogue_state(&conv.id).await.unwrap().unwrap();
        assert_eq!(state.customer_turns, 4);
        assert_eq!(state.preferences["property_type"], "villa");
        assert_eq!(state.preferences["area_preference"], "whitefield");
        assert_eq!(state.stage, "property_matching");
    }

    #[tokio::test]
    async fn rebuilt_state_matches_incremental_after_button_presses() {
        let f = fixture(CrmConfig::default()).await;
        f.pipeline.handle(text("hi")).await.unwrap();
        f.pipeline.handle(text("Asha")).await.unwrap();
        f.pipeline.handle(button("property_type_row_house")).await.unwrap();
        f.pipeline.handle(button("budget_0_50")).await.unwrap();
        f.pipeline.handle(button("location_hebbal")).await.unwrap();

        let conv = conversation(&f).await;
        let record = f.storage.get_dialogue_state(&conv.id).await.unwrap().unwrap();
        let incremental = DialogueState::from_record(&record).unwrap();
        assert_eq!(incremental.preferences.budget_min, None);
        assert_eq!(incremental.preferences.budget_max, Some(5_000_000.0));
        assert_eq!(
            incremental.preferences.property_type.as_deref(),
            Some("row_house")
        );

        // What the pipeline replays when the state row is missing.
        let customer = f
            .storage
            .get_customer_by_external(PLATFORM_TELEGRAM, "42")
            .await
            .unwrap()
            .unwrap();
        let inputs = f.pipeline.customer_inputs(&conv.id).await.unwrap();
        assert_eq!(inputs.len(), 5);
        assert!(matches!(inputs[3], DialogueInput::Button(_)));
        let rebuilt = f.pipeline.engine.replay(&inputs, &customer).unwrap();
        assert_eq!(rebuilt, incremental);
    }

    #[tokio::test]
    async fn edited_message_is_stored_without_reply() {
        let f = fixture(CrmConfig::default()).await;
        let InboundUpdate::Message(msg) = text("hello") else {
            unreachable!()
        };
        f.pipeline
            .handle(InboundUpdate::EditedMessage(msg))
            .await
            .unwrap();

        assert_eq!(f.channel.sent_count().await, 0);
        let conv = conversation(&f).await;
        let messages = f.storage.get_messages(&conv.id, None).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].metadata["is_edited"], true);
    }

    #[tokio::test]
    async fn unsupported_update_is_ignored() {
        let f = fixture(CrmConfig::default()).await;
        f.pipeline
            .handle(InboundUpdate::Unsupported { update_id: 9 })
            .await
            .unwrap();
        assert!(f.storage.list_customers().await.unwrap().is_empty());
        assert_eq!(f.channel.sent_count().await, 0);
    }
}
