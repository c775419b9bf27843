// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the CRM data store.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PropdeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Company, Conversation, Customer, DialogueStateRecord, Lead, Message, NewCustomer, NewLead,
    NewMessage,
};

/// Persistence for companies, customers, conversations, messages, leads and
/// dialogue states.
///
/// Implementations must make the two upserts atomic: concurrent callers with
/// the same natural key observe one row.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the backend (migrations, connection).
    async fn initialize(&self) -> Result<(), PropdeskError>;

    /// Flushes pending writes and releases the connection.
    async fn close(&self) -> Result<(), PropdeskError>;

    // --- Companies ---

    async fn create_company(&self, name: &str) -> Result<Company, PropdeskError>;

    async fn list_companies(&self) -> Result<Vec<Company>, PropdeskError>;

    /// Returns the oldest company with status `active`.
    async fn first_active_company(&self) -> Result<Option<Company>, PropdeskError>;

    // --- Customers ---

    async fn get_customer_by_external(
        &self,
        platform: &str,
        external_id: &str,
    ) -> Result<Option<Customer>, PropdeskError>;

    /// Inserts the customer unless `(platform, external_id)` exists, then
    /// returns the stored row.
    async fn upsert_customer(&self, customer: NewCustomer) -> Result<Customer, PropdeskError>;

    async fn update_customer_profile(
        &self,
        customer_id: &str,
        preferences: &Value,
        lead_score: u8,
    ) -> Result<(), PropdeskError>;

    async fn list_customers(&self) -> Result<Vec<Customer>, PropdeskError>;

    // --- Conversations ---

    /// Inserts the conversation unless the thread exists, then returns it.
    async fn upsert_conversation(
        &self,
        customer_id: &str,
        platform: &str,
        platform_conversation_id: &str,
    ) -> Result<Conversation, PropdeskError>;

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, PropdeskError>;

    async fn update_conversation_activity(
        &self,
        id: &str,
        metadata: &Value,
        last_message_at: &str,
    ) -> Result<(), PropdeskError>;

    async fn list_conversations_for_customer(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Conversation>, PropdeskError>;

    // --- Messages ---

    async fn insert_message(&self, msg: NewMessage) -> Result<Message, PropdeskError>;

    /// Returns messages oldest first, optionally only the most recent `limit`.
    async fn get_messages(
        &self,
        conversation_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, PropdeskError>;

    // --- Leads ---

    async fn insert_lead(&self, lead: NewLead) -> Result<Lead, PropdeskError>;

    /// Inserts the lead only if the customer has no active lead. The check
    /// and the insert run as one unit on the writer.
    async fn insert_lead_if_no_active(
        &self,
        lead: NewLead,
    ) -> Result<Option<Lead>, PropdeskError>;

    async fn get_active_lead(&self, customer_id: &str) -> Result<Option<Lead>, PropdeskError>;

    async fn list_leads_for_customer(&self, customer_id: &str)
    -> Result<Vec<Lead>, PropdeskError>;

    // --- Dialogue state ---

    async fn get_dialogue_state(
        &self,
        conversation_id: &str,
    ) -> Result<Option<DialogueStateRecord>, PropdeskError>;

    async fn save_dialogue_state(&self, state: &DialogueStateRecord)
    -> Result<(), PropdeskError>;
}
