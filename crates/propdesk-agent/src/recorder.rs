// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead and CRM action recording.
//!
//! Two lead paths exist. The dialogue path inserts whenever the engine flags
//! buying intent, even if an active lead already exists. The keyword path
//! inserts only for customers without an active lead, as one
//! check-then-insert on the storage writer. The pipeline runs the dialogue
//! path first, so a first message creates at most one lead.

use std::sync::Arc;

use propdesk_config::model::CrmConfig;
use propdesk_core::types::NewLead;
use propdesk_core::{Conversation, Customer, Lead, LeadStage, PropdeskError, StorageAdapter};
use propdesk_dialogue::{DialogueOutcome, has_property_interest};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

/// Longest message excerpt copied into keyword lead notes, in characters.
const NOTE_EXCERPT_CHARS: usize = 200;

pub const LEAD_SOURCE_DIALOGUE: &str = "dialogue";
pub const LEAD_SOURCE_KEYWORD: &str = "keyword";

/// Writes leads, profile updates and conversation metadata.
pub struct Recorder {
    storage: Arc<dyn StorageAdapter>,
    auto_create_leads: bool,
    history_limit: usize,
}

impl Recorder {
    pub fn new(storage: Arc<dyn StorageAdapter>, crm: &CrmConfig) -> Self {
        Self {
            storage,
            auto_create_leads: crm.auto_create_leads,
            history_limit: crm.metadata_history_limit,
        }
    }

    /// Inserts a lead from a dialogue outcome. Always inserts; an existing
    /// active lead is only reported.
    pub async fn create_enhanced_lead(
        &self,
        customer: &Customer,
        outcome: &DialogueOutcome,
    ) -> Result<Lead, PropdeskError> {
        if let Some(active) = self.storage.get_active_lead(&customer.id).await? {
            warn!(
                customer_id = %customer.id,
                existing_lead = %active.id,
                "customer already has an active lead, creating another"
            );
        }

        let requirements = serde_json::to_value(&outcome.context.preferences)
            .map_err(|e| PropdeskError::Internal(format!("encode requirements: {e}")))?;
        let lead = self
            .storage
            .insert_lead(NewLead {
                customer_id: customer.id.clone(),
                company_id: customer.company_id.clone(),
                stage: outcome.stage.lead_stage(),
                score: outcome.lead_score,
                requirements,
                notes: format!(
                    "Qualified in conversation at stage {}: {}",
                    outcome.stage,
                    outcome.context.preferences.summary().unwrap_or_default()
                ),
                source: LEAD_SOURCE_DIALOGUE.to_string(),
            })
            .await?;
        info!(
            lead_id = %lead.id,
            customer_id = %customer.id,
            stage = %lead.stage,
            score = lead.score,
            "lead created from dialogue"
        );
        Ok(lead)
    }

    /// Inserts a keyword lead when auto-creation is on, the message mentions
    /// property interest and the customer has no active lead.
    pub async fn create_lead_if_needed(
        &self,
        customer: &Customer,
        message: &str,
        score: u8,
        requirements: Value,
    ) -> Result<Option<Lead>, PropdeskError> {
        if !self.auto_create_leads || !has_property_interest(message) {
            return Ok(None);
        }

        let excerpt: String = message.chars().take(NOTE_EXCERPT_CHARS).collect();
        let lead = self
            .storage
            .insert_lead_if_no_active(NewLead {
                customer_id: customer.id.clone(),
                company_id: customer.company_id.clone(),
                stage: LeadStage::New,
                score,
                requirements,
                notes: format!("Auto-created from message: {excerpt}"),
                source: LEAD_SOURCE_KEYWORD.to_string(),
            })
            .await?;
        match &lead {
            Some(lead) => info!(lead_id = %lead.id, customer_id = %customer.id, "keyword lead created"),
            None => debug!(customer_id = %customer.id, "active lead exists, keyword lead skipped"),
        }
        Ok(lead)
    }

    /// Stores the turn's preferences and score on the customer.
    pub async fn update_customer_profile(
        &self,
        customer: &Customer,
        outcome: &DialogueOutcome,
    ) -> Result<(), PropdeskError> {
        let preferences = serde_json::to_value(&outcome.context.preferences)
            .map_err(|e| PropdeskError::Internal(format!("encode preferences: {e}")))?;
        self.storage
            .update_customer_profile(&customer.id, &preferences, outcome.lead_score)
            .await
    }

    /// Appends the turn to the conversation's action history and bumps
    /// `last_message_at`.
    pub async fn track_crm_actions(
        &self,
        conversation: &Conversation,
        outcome: &DialogueOutcome,
        at: &str,
    ) -> Result<(), PropdeskError> {
        let metadata = record_turn(&conversation.metadata, outcome, at, self.history_limit);
        self.storage
            .update_conversation_activity(&conversation.id, &metadata, at)
            .await
    }

    /// Logs where the customer sits in the sales funnel after this turn.
    pub fn track_sales_funnel_progression(
        &self,
        customer: &Customer,
        conversation: &Conversation,
        outcome: &DialogueOutcome,
    ) {
        let insights = &outcome.context.behavioral_insights;
        info!(
            customer_id = %customer.id,
            conversation_id = %conversation.id,
            stage = %outcome.stage,
            funnel_stage = %outcome.stage.funnel_stage(),
            lead_score = outcome.lead_score,
            conversion_likelihood = outcome.context.lead_journey.conversion_likelihood,
            decision_speed = %insights.decision_speed,
            price_sensitivity = %insights.price_sensitivity,
            returning = outcome.context.is_returning_customer,
            "sales funnel snapshot"
        );
    }
}

/// Returns `existing` metadata with this turn recorded. Unknown keys are kept;
/// `action_history` keeps the newest `limit` entries.
pub fn record_turn(existing: &Value, outcome: &DialogueOutcome, at: &str, limit: usize) -> Value {
    let mut metadata = match existing {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    let funnel_stage = outcome.stage.funnel_stage().to_string();
    let mut history = match metadata.remove("action_history") {
        Some(Value::Array(entries)) => entries,
        _ => Vec::new(),
    };
    history.push(json!({
        "actions": outcome.actions,
        "stage": outcome.stage.to_string(),
        "funnel_stage": funnel_stage,
        "confidence": outcome.confidence,
        "at": at,
    }));
    if history.len() > limit {
        history.drain(..history.len() - limit);
    }

    metadata.insert("last_actions".into(), json!(outcome.actions));
    metadata.insert("last_stage".into(), json!(outcome.stage.to_string()));
    metadata.insert("last_confidence".into(), json!(outcome.confidence));
    metadata.insert("last_funnel_stage".into(), json!(funnel_stage));
    metadata.insert(
        "behavioral_insights".into(),
        serde_json::to_value(&outcome.context.behavioral_insights).unwrap_or(Value::Null),
    );
    metadata.insert("action_history".into(), Value::Array(history));
    Value::Object(metadata)
}
