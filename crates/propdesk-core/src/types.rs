// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Propdesk workspace.
//!
//! Stored records (companies, customers, conversations, messages, leads and
//! dialogue states) use `String` identifiers and RFC 3339 timestamps, the
//! same shape the storage layer reads and writes. Inbound and outbound message
//! types are platform-neutral; channel adapters convert to and from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

/// Platform name used for Telegram customers and conversations.
pub const PLATFORM_TELEGRAM: &str = "telegram";

/// Unique identifier for a message delivered by a channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
}

// --- Stored records ---

/// A tenant company that owns customers and leads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    /// `active` or `inactive`.
    pub status: String,
    pub created_at: String,
}

/// A person who contacted the business through a messaging platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub company_id: Option<String>,
    pub platform: String,
    /// Platform user id (Telegram `from.id`).
    pub external_id: String,
    pub display_name: String,
    /// Platform handle, e.g. the Telegram username.
    pub contact_handle: Option<String>,
    /// Acquisition channel.
    pub source: String,
    /// 0-100.
    pub lead_score: u8,
    pub tags: Vec<String>,
    /// Extracted attributes, kept in sync with the dialogue state.
    pub preferences: Value,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One customer's thread on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub customer_id: String,
    pub platform: String,
    /// Platform thread id (Telegram chat id).
    pub platform_conversation_id: String,
    pub status: String,
    pub last_message_at: String,
    /// Action history and last-turn summary, see the recorder in `propdesk-agent`.
    pub metadata: Value,
    pub created_at: String,
    pub updated_at: String,
}

/// Who authored a stored message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    Customer,
    System,
}

/// Normalized message content type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Image,
    Document,
    Audio,
    Video,
    Location,
    Contact,
}

/// Delivery status of a stored message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Received,
    Sent,
    Failed,
}

/// A stored message. Rows are never updated; edits arrive as new rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender: SenderRole,
    pub content: String,
    pub message_type: MessageType,
    pub media_urls: Vec<String>,
    pub status: DeliveryStatus,
    pub platform_message_id: Option<String>,
    pub metadata: Value,
    pub created_at: String,
}

/// Coarse sales funnel position of a lead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadStage {
    New,
    Contacted,
    Qualified,
    SiteVisit,
    Negotiation,
    Closed,
}

/// A sales lead derived from a customer's buying intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub customer_id: String,
    pub company_id: Option<String>,
    pub stage: LeadStage,
    pub score: u8,
    pub requirements: Value,
    pub notes: String,
    /// `active` or `closed`.
    pub status: String,
    /// Which path created the lead: `keyword` or `dialogue`.
    pub source: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Persisted dialogue position for one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueStateRecord {
    pub conversation_id: String,
    pub stage: String,
    pub preferences: Value,
    /// Customer turns already folded into `preferences`.
    pub customer_turns: u32,
    pub updated_at: String,
}

// --- Inbound updates ---

/// The person behind an inbound update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub external_id: String,
    pub display_name: String,
    pub username: Option<String>,
}

/// A media attachment that still has to be resolved to a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_id: String,
    pub message_type: MessageType,
}

/// A message received from a channel, already normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub platform: String,
    pub platform_message_id: String,
    /// Thread the reply goes back to.
    pub chat_id: String,
    pub sender: Sender,
    /// Text, caption, or a bracketed placeholder such as `[Photo]`.
    pub content: String,
    pub message_type: MessageType,
    pub attachments: Vec<Attachment>,
    /// Platform-specific fields kept for the message metadata column.
    pub platform_metadata: Value,
}

impl InboundMessage {
    /// Returns true when the content came from the customer's own words
    /// rather than a placeholder.
    pub fn has_text(&self) -> bool {
        !(self.content.starts_with('[') && self.content.ends_with(']'))
    }
}

/// A quick-reply button press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackInteraction {
    pub platform: String,
    pub callback_id: String,
    pub chat_id: String,
    pub sender: Sender,
    /// Raw button payload, e.g. `budget_50_100`.
    pub data: String,
}

/// The three update shapes the webhook dispatches, plus everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InboundUpdate {
    Message(InboundMessage),
    EditedMessage(InboundMessage),
    Callback(CallbackInteraction),
    /// Update kinds this service ignores (channel posts, polls, ...).
    Unsupported { update_id: i64 },
}

// --- Outbound ---

/// A single quick-reply button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub label: String,
    pub payload: String,
}

impl QuickReply {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// A keyboard of quick-reply buttons, row by row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuickReplies {
    pub rows: Vec<Vec<QuickReply>>,
}

impl QuickReplies {
    /// Returns every payload on the keyboard in row order.
    pub fn payloads(&self) -> Vec<&str> {
        self.rows
            .iter()
            .flatten()
            .map(|b| b.payload.as_str())
            .collect()
    }
}

/// A reply to deliver through a channel adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub chat_id: String,
    pub text: String,
    pub keyboard: Option<QuickReplies>,
}

// --- Insert parameters ---

/// Fields needed to create a customer on first contact.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub platform: String,
    pub external_id: String,
    pub display_name: String,
    pub contact_handle: Option<String>,
    pub company_id: Option<String>,
}

/// A message row before it gets an id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub conversation_id: String,
    pub sender: SenderRole,
    pub content: String,
    pub message_type: MessageType,
    pub media_urls: Vec<String>,
    pub status: DeliveryStatus,
    pub platform_message_id: Option<String>,
    pub metadata: Value,
}

/// A lead row before it gets an id and timestamps. New leads are `active`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub customer_id: String,
    pub company_id: Option<String>,
    pub stage: LeadStage,
    pub score: u8,
    pub requirements: Value,
    pub notes: String,
    pub source: String,
}
